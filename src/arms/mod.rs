//! The ARMS learner, based on a reduction to weighted MAX-SAT.

mod arms_learner;
pub use arms_learner::ArmsLearner;

mod candidates;
pub use candidates::candidate_groundings;

mod constraints_encoder;

mod knowledge;

#[cfg(test)]
pub(crate) mod tests {
    use crate::model::{
        Action, GroundPredicate, Model, Object, Operator, OperatorId, Parameter, Plan, Predicate,
        PredicateId, State, World,
    };

    pub(crate) struct SwitchesProblem {
        pub(crate) model: Model,
        pub(crate) worlds: Vec<World>,
        pub(crate) turn_on: OperatorId,
        pub(crate) turn_off: OperatorId,
        pub(crate) on: PredicateId,
    }

    /// Two operators switching lights, and three fully observed plans.
    pub(crate) fn switches_problem() -> SwitchesProblem {
        let mut model = Model::new("switches");
        let t = model.add_type("switch", &[]).unwrap();
        let s = Parameter::new("s", vec![t]).unwrap();
        let on = model
            .add_predicate(Predicate::new("on", vec![s.clone()]))
            .unwrap();
        let turn_on = model
            .add_operator(Operator::new("turn-on", vec![s.clone()]))
            .unwrap();
        let turn_off = model
            .add_operator(Operator::new("turn-off", vec![s]))
            .unwrap();
        let objects = ["s1", "s2", "s3"]
            .iter()
            .map(|n| Object::new(n, t))
            .collect::<Vec<Object>>();
        let state = |names: &[usize]| {
            Some(State::new(names.iter().map(|i| {
                GroundPredicate::new(&model, on, vec![objects[*i].clone()]).unwrap()
            })))
        };
        let plan = |steps: &[(OperatorId, usize)], states: Vec<Option<State>>| {
            let actions = steps
                .iter()
                .map(|(op, i)| Action::new(&model, *op, vec![objects[*i].clone()]).unwrap())
                .collect();
            Plan::new(actions, states).unwrap()
        };
        let plans = vec![
            plan(
                &[(turn_on, 0), (turn_on, 1), (turn_off, 0)],
                vec![state(&[]), state(&[0]), state(&[0, 1]), state(&[1])],
            ),
            plan(
                &[(turn_off, 2), (turn_on, 2)],
                vec![state(&[2]), state(&[]), state(&[2])],
            ),
            plan(
                &[(turn_on, 1), (turn_off, 1), (turn_on, 0)],
                vec![state(&[]), state(&[1]), state(&[]), state(&[0])],
            ),
        ];
        let worlds = vec![World::new(objects.clone(), plans)];
        SwitchesProblem {
            model,
            worlds,
            turn_on,
            turn_off,
            on,
        }
    }
}
