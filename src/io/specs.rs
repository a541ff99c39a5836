use crate::model::{Model, World};
use anyhow::Result;
use std::io::Read;

/// A learning problem: a model and the worlds in which its operators were observed.
#[derive(Debug, Clone)]
pub struct Problem {
    /// The model.
    pub model: Model,
    /// The worlds.
    pub worlds: Vec<World>,
}

/// A trait implemented by objects able to read learning problems.
pub trait ProblemReader {
    /// Reads a [`Problem`].
    ///
    /// # Example
    ///
    /// ```
    /// # use amlearn::io::{JsonProblemReader, Problem, ProblemReader};
    /// fn read_problem_from_str(s: &str) -> Problem {
    ///     let reader = JsonProblemReader::default();
    ///     reader.read(&mut s.as_bytes()).expect("invalid problem")
    /// }
    /// # read_problem_from_str(r#"{ "domain": { "name": "d" } }"#);
    /// ```
    fn read(&self, reader: &mut dyn Read) -> Result<Problem>;
}
