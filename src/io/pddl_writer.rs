use crate::model::{Binding, Model, Operator, Parameter, PredicateReference, Tree, TypeId};
use anyhow::{Context, Result};
use std::io::Write;

/// A writer for planning domains using the PDDL syntax.
///
/// The domain is written as a `define` form, including the learned preconditions and effects of the operators.
/// Preconditions and effects that are not defined are omitted.
///
/// # Example
///
/// The following example writes a model to the standard output.
///
/// ```
/// # use amlearn::io::DomainWriter;
/// # use amlearn::model::Model;
/// # use anyhow::Result;
/// fn write_model_to_stdout(model: &Model) -> Result<()> {
///     let writer = DomainWriter::default();
///     writer.write_domain(model, &mut std::io::stdout())
/// }
/// # write_model_to_stdout(&Model::new("empty")).unwrap();
/// ```
#[derive(Default)]
pub struct DomainWriter {}

impl DomainWriter {
    /// Writes a model as a PDDL domain to the provided writer.
    pub fn write_domain(&self, model: &Model, writer: &mut dyn Write) -> Result<()> {
        let context = "while writing a PDDL domain";
        writeln!(writer, "(define (domain {})", model.name()).context(context)?;
        write!(writer, "  (:requirements :strips").context(context)?;
        let requirements = model.requirements();
        for (flag, name) in [
            (requirements.typing, ":typing"),
            (requirements.negative_preconditions, ":negative-preconditions"),
            (requirements.equality, ":equality"),
        ] {
            if flag {
                write!(writer, " {}", name).context(context)?;
            }
        }
        writeln!(writer, ")").context(context)?;
        if model.n_types() > 0 {
            writeln!(writer, "  (:types").context(context)?;
            for t in model.iter_type_ids() {
                let ty = model.get_type(t);
                if ty.parents().is_empty() {
                    writeln!(writer, "    {}", ty.name()).context(context)?;
                }
                for p in ty.parents() {
                    writeln!(writer, "    {} - {}", ty.name(), model.get_type(*p).name())
                        .context(context)?;
                }
            }
            writeln!(writer, "  )").context(context)?;
        }
        if !model.constants().is_empty() {
            writeln!(writer, "  (:constants").context(context)?;
            for c in model.constants() {
                writeln!(
                    writer,
                    "    {} - {}",
                    c.name(),
                    model.get_type(c.object_type()).name()
                )
                .context(context)?;
            }
            writeln!(writer, "  )").context(context)?;
        }
        writeln!(writer, "  (:predicates").context(context)?;
        for p in model.iter_predicate_ids() {
            let predicate = model.predicate(p);
            writeln!(
                writer,
                "    ({}{})",
                predicate.name(),
                parameter_list(model, predicate.parameters())
            )
            .context(context)?;
        }
        writeln!(writer, "  )").context(context)?;
        for op in model.iter_operator_ids() {
            write_operator(model, model.operator(op), writer).context(context)?;
        }
        writeln!(writer, ")").context(context)?;
        writer.flush().context(context)
    }
}

fn write_operator(model: &Model, operator: &Operator, writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "  (:action {}", operator.name())?;
    writeln!(
        writer,
        "    :parameters ({})",
        parameter_list(model, operator.parameters()).trim_start()
    )?;
    if let Some(t) = operator.preconditions() {
        writeln!(writer, "    :precondition {}", tree_to_string(model, operator, t))?;
    }
    if let Some(t) = operator.effects() {
        writeln!(writer, "    :effect {}", tree_to_string(model, operator, t))?;
    }
    writeln!(writer, "  )")?;
    Ok(())
}

fn parameter_list(model: &Model, parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| format!(" ?{} - {}", p.name(), type_to_string(model, p.types())))
        .collect()
}

fn type_to_string(model: &Model, types: &[TypeId]) -> String {
    match types {
        [t] => model.get_type(*t).name().to_string(),
        _ => format!(
            "(either {})",
            types
                .iter()
                .map(|t| model.get_type(*t).name())
                .collect::<Vec<&str>>()
                .join(" ")
        ),
    }
}

fn binding_to_string(model: &Model, operator: &Operator, binding: &Binding) -> String {
    match binding {
        Binding::Parameter(i) => format!("?{}", operator.parameters()[*i].name()),
        Binding::Constant(i) => model.constants()[*i].name().to_string(),
    }
}

fn reference_to_string(model: &Model, operator: &Operator, r: &PredicateReference) -> String {
    let mut s = format!("({}", model.predicate(r.predicate()).name());
    for b in r.bindings() {
        s.push(' ');
        s.push_str(&binding_to_string(model, operator, b));
    }
    s.push(')');
    s
}

fn tree_to_string(model: &Model, operator: &Operator, tree: &Tree) -> String {
    let children = |keyword: &str, v: &[Tree]| {
        let mut s = format!("({}", keyword);
        for c in v {
            s.push(' ');
            s.push_str(&tree_to_string(model, operator, c));
        }
        s.push(')');
        s
    };
    match tree {
        Tree::Predicate(r) => reference_to_string(model, operator, r),
        Tree::And(v) => children("and", v.as_slice()),
        Tree::Or(v) => children("or", v.as_slice()),
        Tree::Not(c) => format!("(not {})", tree_to_string(model, operator, c)),
        Tree::Equality(l, r) => format!(
            "(= {} {})",
            binding_to_string(model, operator, l),
            binding_to_string(model, operator, r)
        ),
    }
}
