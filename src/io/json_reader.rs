use super::{Problem, ProblemReader};
use crate::model::{
    Action, Binding, GroundPredicate, Model, Object, Operator, Parameter, Plan, Predicate,
    PredicateReference, Requirements, State, Tree, TypeId, World,
};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonProblem {
    domain: JsonDomain,
    #[serde(default)]
    worlds: Vec<JsonWorld>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonDomain {
    name: String,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default)]
    types: Vec<JsonType>,
    #[serde(default)]
    constants: Vec<JsonObject>,
    #[serde(default)]
    predicates: Vec<JsonSchema>,
    #[serde(default)]
    operators: Vec<JsonOperator>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonType {
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonObject {
    name: String,
    #[serde(rename = "type")]
    object_type: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonParameter {
    name: String,
    types: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonSchema {
    name: String,
    #[serde(default)]
    parameters: Vec<JsonParameter>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonOperator {
    name: String,
    #[serde(default)]
    parameters: Vec<JsonParameter>,
    preconditions: Option<JsonTree>,
    effects: Option<JsonTree>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum JsonTree {
    And(Vec<JsonTree>),
    Or(Vec<JsonTree>),
    Not(Box<JsonTree>),
    Predicate(Vec<String>),
    Equal(String, String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonWorld {
    #[serde(default)]
    objects: Vec<JsonObject>,
    #[serde(default)]
    plans: Vec<JsonPlan>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonPlan {
    actions: Vec<Vec<String>>,
    states: Option<Vec<Option<Vec<Vec<String>>>>>,
}

/// A reader for learning problems written in JSON.
///
/// The domain gives the types, constants, predicates and operators of the model.
/// Each world gives its objects and its plans; actions and facts are lists of names beginning with the operator or the predicate.
/// Inside operator conditions, names starting with `?` refer to operator parameters, while other names refer to constants.
/// The states of a plan are optional; a `null` state is unknown.
///
/// # Example
///
/// ```
/// # use amlearn::io::{JsonProblemReader, ProblemReader};
/// let json = r#"{
///     "domain": {
///         "name": "switches",
///         "types": [{ "name": "switch" }],
///         "predicates": [{ "name": "on", "parameters": [{ "name": "s", "types": ["switch"] }] }],
///         "operators": [{ "name": "turn-on", "parameters": [{ "name": "s", "types": ["switch"] }] }]
///     },
///     "worlds": [{
///         "objects": [{ "name": "s1", "type": "switch" }],
///         "plans": [{ "actions": [["turn-on", "s1"]], "states": [[], [["on", "s1"]]] }]
///     }]
/// }"#;
/// let problem = JsonProblemReader::default().read(&mut json.as_bytes()).unwrap();
/// assert_eq!("switches", problem.model.name());
/// assert_eq!(1, problem.worlds[0].plans().len());
/// ```
#[derive(Default)]
pub struct JsonProblemReader;

impl ProblemReader for JsonProblemReader {
    fn read(&self, reader: &mut dyn Read) -> Result<Problem> {
        let json: JsonProblem =
            serde_json::from_reader(reader).context("while parsing the JSON problem")?;
        let model = read_domain(&json.domain)?;
        let worlds = json
            .worlds
            .iter()
            .enumerate()
            .map(|(i, w)| read_world(&model, w).with_context(|| format!("in world {}", i)))
            .collect::<Result<Vec<World>>>()?;
        Ok(Problem { model, worlds })
    }
}

fn read_domain(domain: &JsonDomain) -> Result<Model> {
    let mut model = Model::new(&domain.name);
    let mut requirements = Requirements::default();
    for r in domain.requirements.iter() {
        match r.as_str() {
            "typing" => requirements.typing = true,
            "negative-preconditions" => requirements.negative_preconditions = true,
            "equality" => requirements.equality = true,
            "strips" => {}
            _ => return Err(anyhow!("unsupported requirement: {}", r)),
        }
    }
    requirements.typing |= !domain.types.is_empty();
    model.set_requirements(requirements);
    for t in domain.types.iter() {
        model.add_type(&t.name, &[])?;
    }
    for t in domain.types.iter() {
        let id = model.type_by_name(&t.name)?;
        for p in t.parents.iter() {
            let parent = model.type_by_name(p).with_context(|| format!("in type {}", t.name))?;
            model.add_parent_type(id, parent)?;
        }
    }
    for c in domain.constants.iter() {
        let object = read_object(&model, c)?;
        model.add_constant(object)?;
    }
    for p in domain.predicates.iter() {
        let parameters = read_parameters(&model, &p.parameters)
            .with_context(|| format!("in predicate {}", p.name))?;
        model.add_predicate(Predicate::new(&p.name, parameters))?;
    }
    for o in domain.operators.iter() {
        let operator = read_operator(&model, o).with_context(|| format!("in operator {}", o.name))?;
        model.add_operator(operator)?;
    }
    Ok(model)
}

fn read_object(model: &Model, object: &JsonObject) -> Result<Object> {
    let t = model
        .type_by_name(&object.object_type)
        .with_context(|| format!("in object {}", object.name))?;
    Ok(Object::new(&object.name, t))
}

fn read_parameters(model: &Model, parameters: &[JsonParameter]) -> Result<Vec<Parameter>> {
    parameters
        .iter()
        .map(|p| {
            let types = p
                .types
                .iter()
                .map(|t| model.type_by_name(t))
                .collect::<Result<Vec<TypeId>>>()?;
            Parameter::new(&p.name, types)
        })
        .collect()
}

fn read_operator(model: &Model, operator: &JsonOperator) -> Result<Operator> {
    let parameters = read_parameters(model, &operator.parameters)?;
    let mut result = Operator::new(&operator.name, parameters);
    let preconditions = operator
        .preconditions
        .as_ref()
        .map(|t| read_tree(model, &result, t))
        .transpose()
        .context("in preconditions")?;
    let effects = operator
        .effects
        .as_ref()
        .map(|t| read_tree(model, &result, t))
        .transpose()
        .context("in effects")?;
    result.set_preconditions(preconditions);
    result.set_effects(effects);
    Ok(result)
}

fn read_tree(model: &Model, operator: &Operator, tree: &JsonTree) -> Result<Tree> {
    let children = |v: &[JsonTree]| {
        v.iter()
            .map(|c| read_tree(model, operator, c))
            .collect::<Result<Vec<Tree>>>()
    };
    Ok(match tree {
        JsonTree::And(v) => Tree::And(children(v.as_slice())?),
        JsonTree::Or(v) => Tree::Or(children(v.as_slice())?),
        JsonTree::Not(c) => Tree::Not(Box::new(read_tree(model, operator, c)?)),
        JsonTree::Predicate(names) => {
            let (name, terms) = names
                .split_first()
                .ok_or_else(|| anyhow!("empty predicate reference"))?;
            let predicate = model.predicate_by_name(name)?;
            if model.predicate(predicate).arity() != terms.len() {
                return Err(anyhow!(
                    "predicate {} expects {} argument(s), got {}",
                    name,
                    model.predicate(predicate).arity(),
                    terms.len()
                ));
            }
            let bindings = terms
                .iter()
                .map(|t| read_binding(model, operator, t))
                .collect::<Result<Vec<Binding>>>()?;
            Tree::Predicate(PredicateReference::new(predicate, bindings))
        }
        JsonTree::Equal(left, right) => Tree::Equality(
            read_binding(model, operator, left)?,
            read_binding(model, operator, right)?,
        ),
    })
}

fn read_binding(model: &Model, operator: &Operator, term: &str) -> Result<Binding> {
    match term.strip_prefix('?') {
        Some(name) => operator
            .parameters()
            .iter()
            .position(|p| p.name() == name)
            .map(Binding::Parameter)
            .ok_or_else(|| anyhow!("no such parameter: {}", term)),
        None => model.constant_by_name(term).map(Binding::Constant),
    }
}

fn read_world(model: &Model, world: &JsonWorld) -> Result<World> {
    let objects = world
        .objects
        .iter()
        .map(|o| read_object(model, o))
        .collect::<Result<Vec<Object>>>()?;
    let object_by_name = |name: &str| -> Result<Object> {
        objects
            .iter()
            .chain(model.constants().iter())
            .find(|o| o.name() == name)
            .cloned()
            .ok_or_else(|| anyhow!("no such object: {}", name))
    };
    let mut plans = Vec::with_capacity(world.plans.len());
    for (i, plan) in world.plans.iter().enumerate() {
        let context = || format!("in plan {}", i);
        let actions = plan
            .actions
            .iter()
            .map(|names| {
                let (name, args) = names
                    .split_first()
                    .ok_or_else(|| anyhow!("empty action"))?;
                let operator = model.operator_by_name(name)?;
                let args = args
                    .iter()
                    .map(|a| object_by_name(a))
                    .collect::<Result<Vec<Object>>>()?;
                Action::new(model, operator, args)
            })
            .collect::<Result<Vec<Action>>>()
            .with_context(context)?;
        let p = match &plan.states {
            None => Plan::with_unknown_states(actions),
            Some(states) => {
                let states = states
                    .iter()
                    .map(|s| {
                        s.as_ref()
                            .map(|facts| {
                                facts
                                    .iter()
                                    .map(|f| {
                                        let (name, args) = f
                                            .split_first()
                                            .ok_or_else(|| anyhow!("empty fact"))?;
                                        let predicate = model.predicate_by_name(name)?;
                                        let args = args
                                            .iter()
                                            .map(|a| object_by_name(a))
                                            .collect::<Result<Vec<Object>>>()?;
                                        GroundPredicate::new(model, predicate, args)
                                    })
                                    .collect::<Result<Vec<GroundPredicate>>>()
                                    .map(State::new)
                            })
                            .transpose()
                    })
                    .collect::<Result<Vec<Option<State>>>>()
                    .with_context(context)?;
                Plan::new(actions, states).with_context(context)?
            }
        };
        plans.push(p);
    }
    Ok(World::new(objects, plans))
}
