//! Objects used to read learning problems and write learned domains.

mod json_reader;
pub use json_reader::JsonProblemReader;

mod pddl_writer;
pub use pddl_writer::DomainWriter;

mod specs;
pub use specs::Problem;
pub use specs::ProblemReader;
