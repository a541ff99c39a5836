use std::{
    fmt::Display,
    num::{NonZeroIsize, NonZeroUsize},
};

/// A variable of a weighted formula.
///
/// A variable is represented by a non-null positive integer.
/// It can be obtained through the [From] trait from an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroUsize);

macro_rules! impl_var_from {
    ($t: ty) => {
        impl From<$t> for Variable {
            fn from(v: $t) -> Self {
                Self(NonZeroUsize::try_from(v as usize).unwrap())
            }
        }
    };
}
impl_var_from!(usize);

macro_rules! impl_var_from_neg {
    ($t: ty) => {
        impl From<$t> for Variable {
            fn from(v: $t) -> Self {
                if v < 0 {
                    panic!("cannot build a variable from a negative integer")
                }
                Self(NonZeroUsize::try_from(v as usize).unwrap())
            }
        }
    };
}
impl_var_from_neg!(i32);

impl From<Variable> for usize {
    fn from(v: Variable) -> Self {
        v.0.into()
    }
}

impl Variable {
    /// Returns the positive literal of this variable.
    pub fn positive(self) -> Literal {
        Literal(NonZeroIsize::try_from(self.0.get() as isize).unwrap())
    }

    /// Returns the negative literal of this variable.
    pub fn negative(self) -> Literal {
        self.positive().negate()
    }

    /// Returns the literal of this variable with the given polarity.
    pub fn literal(self, polarity: bool) -> Literal {
        if polarity {
            self.positive()
        } else {
            self.negative()
        }
    }

    pub(crate) fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal of a weighted formula.
///
/// A literal is represented by a non-null integer.
/// It can be obtained through the [From] trait from a signed integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal(NonZeroIsize);

impl Literal {
    /// Returns the opposite literal.
    pub fn negate(self) -> Self {
        Self::from(-self.0.get())
    }

    /// Returns the variable of this literal.
    pub fn var(&self) -> Variable {
        Variable(self.0.unsigned_abs())
    }

    /// Returns `true` iff this literal is the positive one of its variable.
    pub fn is_positive(&self) -> bool {
        self.0.get() > 0
    }
}

macro_rules! impl_lit_from {
    ($t: ty) => {
        impl From<$t> for Literal {
            fn from(l: $t) -> Self {
                Self(NonZeroIsize::try_from(l as isize).unwrap())
            }
        }
    };
}
impl_lit_from!(isize);
impl_lit_from!(i32);

impl From<Literal> for isize {
    fn from(l: Literal) -> Self {
        l.0.into()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a clause from a list of integers.
#[macro_export]
macro_rules! clause {
    () => (
        vec![] as Vec<$crate::sat::Literal>
    );
    ($($x:expr),+ $(,)?) => (
        [$($x),+].into_iter().map($crate::sat::Literal::from).collect::<Vec<$crate::sat::Literal>>()
    );
}

/// A weighted disjunction of conjunctions of literals.
///
/// A plain clause is a disjunction of terms made of a single literal each.
/// A clause is satisfied by an assignment iff one of its terms has all its literals set to true;
/// a clause with an empty term is thus always satisfied, and a clause with no term never is.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedClause {
    terms: Vec<Vec<Literal>>,
    weight: f64,
}

impl WeightedClause {
    /// Returns the terms of the clause.
    pub fn terms(&self) -> &[Vec<Literal>] {
        &self.terms
    }

    /// Returns the weight of the clause.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns `true` iff the clause is satisfied by the assignment.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.terms
            .iter()
            .any(|t| t.iter().all(|l| assignment.literal_value(*l)))
    }
}

impl Display for WeightedClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.weight)?;
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " |")?;
            }
            for l in t.iter() {
                write!(f, " {}", l)?;
            }
        }
        Ok(())
    }
}

/// A weighted MAX-SAT formula.
///
/// Besides its clauses, a formula may split its variables into size groups.
/// Each group with more true variables than the size bound decreases the value of an assignment by the size penalty.
///
/// # Example
///
/// ```
/// # use amlearn::sat::{Assignment, Formula};
/// let mut formula = Formula::default();
/// let x = formula.new_var(None);
/// let y = formula.new_var(None);
/// formula.add_clause(vec![x.positive(), y.positive()], 3.);
/// formula.add_clause(vec![y.negative()], 2.);
/// assert_eq!(5., formula.max_value());
/// let assignment = Assignment::new(vec![true, false]);
/// assert_eq!(5., formula.value(&assignment));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    n_vars: usize,
    clauses: Vec<WeightedClause>,
    var_groups: Vec<Option<usize>>,
    n_groups: usize,
    size_bound: usize,
    size_penalty: f64,
}

impl Default for Formula {
    fn default() -> Self {
        Self::with_size_limit(usize::MAX, 0.)
    }
}

impl Formula {
    /// Builds an empty formula penalizing the groups having more than `size_bound` true variables.
    pub fn with_size_limit(size_bound: usize, size_penalty: f64) -> Self {
        Self {
            n_vars: 0,
            clauses: vec![],
            var_groups: vec![],
            n_groups: 0,
            size_bound,
            size_penalty,
        }
    }

    /// Creates a new size group and returns its index.
    pub fn new_group(&mut self) -> usize {
        self.n_groups += 1;
        self.n_groups - 1
    }

    /// Creates a new variable, optionally belonging to a size group.
    ///
    /// # Panics
    ///
    /// Panics if the group was not created by [`new_group`](Self::new_group).
    pub fn new_var(&mut self, group: Option<usize>) -> Variable {
        if let Some(g) = group {
            assert!(g < self.n_groups, "undefined size group {}", g);
        }
        self.n_vars += 1;
        self.var_groups.push(group);
        Variable::from(self.n_vars)
    }

    /// Adds a plain clause.
    pub fn add_clause(&mut self, clause: Vec<Literal>, weight: f64) {
        self.add_multiclause(clause.into_iter().map(|l| vec![l]).collect(), weight)
    }

    /// Adds a disjunction of conjunctions of literals.
    ///
    /// # Panics
    ///
    /// Panics if a literal refers to a variable not created by [`new_var`](Self::new_var).
    pub fn add_multiclause(&mut self, terms: Vec<Vec<Literal>>, weight: f64) {
        assert!(
            terms
                .iter()
                .flatten()
                .all(|l| usize::from(l.var()) <= self.n_vars),
            "undefined variable in clause"
        );
        self.clauses.push(WeightedClause { terms, weight })
    }

    /// Returns the number of variables.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Returns the clauses.
    pub fn clauses(&self) -> &[WeightedClause] {
        &self.clauses
    }

    /// Returns the number of size groups.
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Returns the size group of a variable.
    pub fn group_of(&self, v: Variable) -> Option<usize> {
        self.var_groups[v.index()]
    }

    /// Returns the number of true variables a group may have without penalty.
    pub fn size_bound(&self) -> usize {
        self.size_bound
    }

    /// Returns the penalty of a group exceeding the size bound.
    pub fn size_penalty(&self) -> f64 {
        self.size_penalty
    }

    /// Returns the theoretical maximal value, that is the sum of the clause weights.
    pub fn max_value(&self) -> f64 {
        self.clauses.iter().map(|c| c.weight).sum()
    }

    /// Computes the value of an assignment.
    pub fn value(&self, assignment: &Assignment) -> f64 {
        let satisfied = self
            .clauses
            .iter()
            .filter(|c| c.is_satisfied_by(assignment))
            .map(|c| c.weight)
            .sum::<f64>();
        let mut group_sizes = vec![0; self.n_groups];
        self.var_groups
            .iter()
            .enumerate()
            .filter(|(i, _)| assignment.0[*i])
            .filter_map(|(_, g)| *g)
            .for_each(|g| group_sizes[g] += 1);
        let n_exceeding = group_sizes.iter().filter(|s| **s > self.size_bound).count();
        satisfied - self.size_penalty * n_exceeding as f64
    }
}

/// A complete assignment of the variables of a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment(Vec<bool>);

impl Assignment {
    /// Builds an assignment; the value at index `i` is the one of variable `i+1`.
    pub fn new(values: Vec<bool>) -> Self {
        Self(values)
    }

    /// Returns the value assigned to the variable.
    pub fn value_of<T>(&self, v: T) -> bool
    where
        T: Into<Variable>,
    {
        self.0[v.into().index()]
    }

    /// Returns `true` iff the literal is satisfied.
    pub fn literal_value(&self, l: Literal) -> bool {
        self.value_of(l.var()) == l.is_positive()
    }

    /// Returns the number of assigned variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff no variable is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_from_pos() {
        let v = Variable::from(1);
        assert_eq!(1, usize::from(v))
    }

    #[test]
    #[allow(unused_must_use)]
    #[should_panic]
    fn test_var_from_null() {
        Variable::from(0);
    }

    #[test]
    #[allow(unused_must_use)]
    #[should_panic]
    fn test_var_from_neg() {
        Variable::from(-1);
    }

    #[test]
    fn test_lit_from_neg() {
        let l = Literal::from(-1);
        assert_eq!(-1, isize::from(l));
        assert!(!l.is_positive());
        assert_eq!(Variable::from(1), l.var());
    }

    #[test]
    fn test_negate_lit() {
        assert_eq!(Literal::from(-1), Literal::from(1).negate());
        assert_eq!(Literal::from(1), Literal::from(-1).negate());
        assert_eq!(Literal::from(-2), Variable::from(2).literal(false));
    }

    #[test]
    fn test_multiclause_value() {
        let mut f = Formula::default();
        let a = f.new_var(None);
        let b = f.new_var(None);
        let c = f.new_var(None);
        f.add_multiclause(
            vec![vec![a.positive(), b.positive()], vec![c.negative()]],
            4.,
        );
        assert_eq!(4., f.value(&Assignment::new(vec![true, true, true])));
        assert_eq!(0., f.value(&Assignment::new(vec![true, false, true])));
        assert_eq!(4., f.value(&Assignment::new(vec![false, false, false])));
    }

    #[test]
    fn test_empty_term_and_empty_clause() {
        let mut f = Formula::default();
        f.new_var(None);
        f.add_multiclause(vec![vec![]], 1.);
        f.add_clause(clause![], 2.);
        assert_eq!(3., f.max_value());
        assert_eq!(1., f.value(&Assignment::new(vec![false])));
    }

    #[test]
    fn test_size_penalty() {
        let mut f = Formula::with_size_limit(1, 10.);
        let g = f.new_group();
        let a = f.new_var(Some(g));
        let b = f.new_var(Some(g));
        let c = f.new_var(None);
        f.add_clause(vec![a.positive()], 3.);
        f.add_clause(vec![b.positive()], 3.);
        assert_eq!(Some(g), f.group_of(a));
        assert_eq!(None, f.group_of(c));
        assert_eq!(3., f.value(&Assignment::new(vec![true, false, true])));
        assert_eq!(-4., f.value(&Assignment::new(vec![true, true, true])));
    }

    #[test]
    #[should_panic]
    fn test_undefined_var() {
        let mut f = Formula::default();
        f.add_clause(clause![1], 1.);
    }

    #[test]
    fn test_display_clause() {
        let mut f = Formula::default();
        f.new_var(None);
        f.new_var(None);
        f.add_multiclause(vec![clause![1, -2], clause![2]], 1.5);
        assert_eq!("1.5: 1 -2 | 2", f.clauses()[0].to_string());
    }
}
