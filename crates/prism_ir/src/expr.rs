//! The expression algebra.
//!
//! [`Expr`] covers both vector-valued expressions (bitwise operators,
//! identifiers, constants) and boolean-valued ones (reductions, logical
//! operators, equality tests, the literals). Boolean-valued variants are
//! reported by [`Expr::is_logic`]; their value as a vector is one bit wide.
//!
//! Cloning an expression is never purely structural: every clone applies the
//! canonical rewrites (dropping `false` from `||`, `true` from `&&`,
//! collapsing chained `!`, unwrapping `|x` over an already boolean `x`, and
//! turning a comparison against a boolean literal into the other operand).

use prism_common::{BitGroup, Bitmask, DynamicBitmask, MappedGroup};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A symbolic expression over virtual input bits.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// The virtual input bits named by a bit group, low index first.
    Identifier(MappedGroup),
    /// A literal bit vector.
    Constant(DynamicBitmask),
    /// Bitwise complement (`~x`), same width as the operand.
    Not(Box<Expr>),
    /// Bitwise and (`a & b`).
    And(Box<Expr>, Box<Expr>),
    /// Bitwise or (`a | b`).
    Or(Box<Expr>, Box<Expr>),
    /// Bitwise exclusive or (`a ^ b`).
    Xor(Box<Expr>, Box<Expr>),
    /// Bitwise exclusive nor (`a ~^ b`).
    Xnor(Box<Expr>, Box<Expr>),
    /// Equality of the zero-extended operands (`a == b`).
    Equality(Box<Expr>, Box<Expr>),
    /// Inequality of the zero-extended operands (`a != b`).
    NotEqual(Box<Expr>, Box<Expr>),
    /// True if any bit is set (`|x`).
    ReduceOr(Box<Expr>),
    /// True if every bit is set (`&x`).
    ReduceAnd(Box<Expr>),
    /// True if an odd number of bits is set (`^x`).
    ReduceXor(Box<Expr>),
    /// Logical negation (`!x`).
    LogicNot(Box<Expr>),
    /// Logical conjunction (`a && b`).
    LogicAnd(Box<Expr>, Box<Expr>),
    /// Logical disjunction (`a || b`).
    LogicOr(Box<Expr>, Box<Expr>),
    /// The literal `true`.
    True,
    /// The literal `false`.
    False,
}

impl Expr {
    /// An identifier over the given virtual inputs.
    pub fn ident(group: &dyn BitGroup) -> Self {
        Self::Identifier(MappedGroup::from_group(group))
    }

    /// A single virtual input bit.
    pub fn input(bit: usize) -> Self {
        Self::Identifier(MappedGroup::from_indices(vec![bit]))
    }

    /// A literal vector of `width` bits holding `value`.
    pub fn constant(value: u64, width: usize) -> Self {
        Self::Constant(DynamicBitmask::from_u64(value, width))
    }

    /// The boolean literal for `value`.
    pub fn literal(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }

    /// `a == b`.
    pub fn equality(a: Expr, b: Expr) -> Self {
        Self::Equality(Box::new(a), Box::new(b))
    }

    /// `a != b`.
    pub fn not_equal(a: Expr, b: Expr) -> Self {
        Self::NotEqual(Box::new(a), Box::new(b))
    }

    /// `!e`, coercing a vector operand to boolean first.
    pub fn logic_not(e: Expr) -> Self {
        Self::LogicNot(Box::new(e.into_logic()))
    }

    /// `a && b`, coercing vector operands to boolean first.
    pub fn logic_and(a: Expr, b: Expr) -> Self {
        Self::LogicAnd(Box::new(a.into_logic()), Box::new(b.into_logic()))
    }

    /// `a || b`, coercing vector operands to boolean first.
    pub fn logic_or(a: Expr, b: Expr) -> Self {
        Self::LogicOr(Box::new(a.into_logic()), Box::new(b.into_logic()))
    }

    /// Returns `true` for boolean-valued variants.
    pub fn is_logic(&self) -> bool {
        matches!(
            self,
            Self::Equality(..)
                | Self::NotEqual(..)
                | Self::ReduceOr(_)
                | Self::ReduceAnd(_)
                | Self::ReduceXor(_)
                | Self::LogicNot(_)
                | Self::LogicAnd(..)
                | Self::LogicOr(..)
                | Self::True
                | Self::False
        )
    }

    /// Converts a vector expression into a boolean one by `|x`.
    ///
    /// Boolean expressions are returned unchanged.
    pub fn into_logic(self) -> Self {
        if self.is_logic() {
            self
        } else {
            Self::ReduceOr(Box::new(self))
        }
    }

    /// Attempts to fold a boolean expression to a compile-time constant.
    ///
    /// Detects literals and combinations that fold transitively through
    /// `!`, `&&`, `||` and reductions of literal vectors. Returns `None` when
    /// the value depends on inputs or cannot be determined locally.
    pub fn constant_solve(&self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::LogicNot(c) => c.constant_solve().map(|v| !v),
            Self::LogicOr(l, r) => match (l.constant_solve(), r.constant_solve()) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Self::LogicAnd(l, r) => match (l.constant_solve(), r.constant_solve()) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Self::ReduceOr(c) => match c.as_ref() {
                Self::Constant(m) => Some(m.count() != 0),
                c if c.is_logic() => c.constant_solve(),
                _ => None,
            },
            Self::ReduceAnd(c) => match c.as_ref() {
                Self::Constant(m) => Some(m.count() == m.size()),
                _ => None,
            },
            Self::ReduceXor(c) => match c.as_ref() {
                Self::Constant(m) => Some(m.count() & 1 == 1),
                _ => None,
            },
            _ => None,
        }
    }

    /// Marks every virtual input bit this expression reads.
    pub fn collect_inputs(&self, nodes: &mut DynamicBitmask) {
        match self {
            Self::Identifier(group) => {
                for bit in group.indices() {
                    nodes.insert(bit);
                }
            }
            Self::Constant(_) | Self::True | Self::False => {}
            Self::Not(c)
            | Self::ReduceOr(c)
            | Self::ReduceAnd(c)
            | Self::ReduceXor(c)
            | Self::LogicNot(c) => c.collect_inputs(nodes),
            Self::And(l, r)
            | Self::Or(l, r)
            | Self::Xor(l, r)
            | Self::Xnor(l, r)
            | Self::Equality(l, r)
            | Self::NotEqual(l, r)
            | Self::LogicAnd(l, r)
            | Self::LogicOr(l, r) => {
                l.collect_inputs(nodes);
                r.collect_inputs(nodes);
            }
        }
    }

    /// Returns the set of virtual input bits this expression reads.
    pub fn inputs(&self) -> DynamicBitmask {
        let mut nodes = DynamicBitmask::new();
        self.collect_inputs(&mut nodes);
        nodes
    }

    /// Evaluates the expression against concrete virtual input values.
    ///
    /// Boolean expressions yield a one-bit vector.
    pub fn evaluate(&self, inp: &dyn Bitmask) -> DynamicBitmask {
        match self {
            Self::Identifier(group) => {
                let mut out = DynamicBitmask::with_size(group.size());
                for (bit, src) in group.indices().enumerate() {
                    out.put(bit, inp.get(src));
                }
                out
            }
            Self::Constant(mask) => mask.clone(),
            Self::Not(c) => {
                let val = c.evaluate(inp);
                let mut out = DynamicBitmask::with_size(val.size());
                for bit in 0..val.size() {
                    out.put(bit, !val.get(bit));
                }
                out
            }
            Self::And(l, r) => bitwise(&l.evaluate(inp), &r.evaluate(inp), false, |a, b| a & b),
            Self::Or(l, r) => bitwise(&l.evaluate(inp), &r.evaluate(inp), false, |a, b| a | b),
            Self::Xor(l, r) => bitwise(&l.evaluate(inp), &r.evaluate(inp), false, |a, b| a ^ b),
            Self::Xnor(l, r) => {
                bitwise(&l.evaluate(inp), &r.evaluate(inp), true, |a, b| !(a ^ b))
            }
            _ => {
                let mut out = DynamicBitmask::with_size(1);
                out.put(0, self.evaluate_logic(inp));
                out
            }
        }
    }

    /// Evaluates the expression as a boolean.
    ///
    /// A vector expression is true when any of its bits is set.
    pub fn evaluate_logic(&self, inp: &dyn Bitmask) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::ReduceOr(c) => c.evaluate(inp).count() != 0,
            Self::ReduceAnd(c) => {
                let val = c.evaluate(inp);
                val.count() == val.size()
            }
            Self::ReduceXor(c) => c.evaluate(inp).count() & 1 == 1,
            Self::LogicNot(c) => !c.evaluate_logic(inp),
            Self::LogicAnd(l, r) => l.evaluate_logic(inp) && r.evaluate_logic(inp),
            Self::LogicOr(l, r) => l.evaluate_logic(inp) || r.evaluate_logic(inp),
            Self::Equality(l, r) => l.evaluate(inp).equals(&r.evaluate(inp)),
            Self::NotEqual(l, r) => !l.evaluate(inp).equals(&r.evaluate(inp)),
            _ => self.evaluate(inp).count() != 0,
        }
    }

    /// Folds `a == b` or `a != b` between two booleans when one side is a
    /// literal. `invert` is set for `!=`.
    fn fold_compare(l: &Expr, r: &Expr, invert: bool) -> Option<Expr> {
        if !l.is_logic() || !r.is_logic() {
            return None;
        }
        let (other, value) = match (l.constant_solve(), r.constant_solve()) {
            (Some(value), _) => (r, value),
            (None, Some(value)) => (l, value),
            (None, None) => return None,
        };
        if value != invert {
            Some(other.clone())
        } else {
            Some(Self::LogicNot(Box::new(other.clone())).clone())
        }
    }
}

/// Applies `op` bit by bit over the wider of the two operands, substituting
/// `missing` for bits past the end of the narrower one.
fn bitwise(
    l: &DynamicBitmask,
    r: &DynamicBitmask,
    missing: bool,
    op: impl Fn(bool, bool) -> bool,
) -> DynamicBitmask {
    let width = l.size().max(r.size());
    let pick = |m: &DynamicBitmask, bit: usize| if bit < m.size() { m.get(bit) } else { missing };
    let mut out = DynamicBitmask::with_size(width);
    for bit in 0..width {
        out.put(bit, op(pick(l, bit), pick(r, bit)));
    }
    out
}

impl Clone for Expr {
    fn clone(&self) -> Self {
        match self {
            Self::Identifier(g) => Self::Identifier(g.clone()),
            Self::Constant(m) => Self::Constant(m.clone()),
            Self::Not(c) => Self::Not(c.clone()),
            Self::And(l, r) => Self::And(l.clone(), r.clone()),
            Self::Or(l, r) => Self::Or(l.clone(), r.clone()),
            Self::Xor(l, r) => Self::Xor(l.clone(), r.clone()),
            Self::Xnor(l, r) => Self::Xnor(l.clone(), r.clone()),
            Self::Equality(l, r) => Self::fold_compare(l, r, false)
                .unwrap_or_else(|| Self::Equality(l.clone(), r.clone())),
            Self::NotEqual(l, r) => Self::fold_compare(l, r, true)
                .unwrap_or_else(|| Self::NotEqual(l.clone(), r.clone())),
            Self::ReduceOr(c) if c.is_logic() => (**c).clone(),
            Self::ReduceOr(c) => Self::ReduceOr(c.clone()),
            Self::ReduceAnd(c) => Self::ReduceAnd(c.clone()),
            Self::ReduceXor(c) => Self::ReduceXor(c.clone()),
            Self::LogicNot(c) => {
                let mut inner: &Expr = c;
                let mut inverted = true;
                while let Self::LogicNot(next) = inner {
                    inner = next.as_ref();
                    inverted = !inverted;
                }
                if inverted {
                    Self::LogicNot(Box::new(inner.clone()))
                } else {
                    inner.clone()
                }
            }
            Self::LogicOr(l, r) => {
                if l.constant_solve() == Some(false) {
                    (**r).clone()
                } else if r.constant_solve() == Some(false) {
                    (**l).clone()
                } else {
                    Self::LogicOr(l.clone(), r.clone())
                }
            }
            Self::LogicAnd(l, r) => {
                if l.constant_solve() == Some(true) {
                    (**r).clone()
                } else if r.constant_solve() == Some(true) {
                    (**l).clone()
                } else {
                    Self::LogicAnd(l.clone(), r.clone())
                }
            }
            Self::True => Self::True,
            Self::False => Self::False,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(g) => write!(f, "{g}"),
            Self::Constant(m) => write!(f, "{m}"),
            Self::Not(c) => write!(f, "~{c}"),
            Self::And(l, r) => write!(f, "({l} & {r})"),
            Self::Or(l, r) => write!(f, "({l} | {r})"),
            Self::Xor(l, r) => write!(f, "({l} ^ {r})"),
            Self::Xnor(l, r) => write!(f, "({l} ~^ {r})"),
            Self::Equality(l, r) => write!(f, "({l} == {r})"),
            Self::NotEqual(l, r) => write!(f, "({l} != {r})"),
            Self::ReduceOr(c) => write!(f, "|{c}"),
            Self::ReduceAnd(c) => write!(f, "&{c}"),
            Self::ReduceXor(c) => write!(f, "^{c}"),
            Self::LogicNot(c) => write!(f, "!{c}"),
            Self::LogicAnd(l, r) => write!(f, "({l} && {r})"),
            Self::LogicOr(l, r) => write!(f, "({l} || {r})"),
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_common::{ones, OffsetGroup};

    fn inputs(value: u64, width: usize) -> DynamicBitmask {
        DynamicBitmask::from_u64(value, width)
    }

    #[test]
    fn identifier_reads_mapped_bits() {
        let e = Expr::Identifier(MappedGroup::from_indices(vec![3, 0]));
        let v = e.evaluate(&inputs(0b1000, 4));
        assert_eq!(v.size(), 2);
        assert!(v.get(0));
        assert!(!v.get(1));
    }

    #[test]
    fn collect_inputs_unions_operands() {
        let e = Expr::logic_and(Expr::input(2), Expr::ident(&OffsetGroup::new(5, 2)));
        let found: Vec<usize> = ones(&e.inputs()).collect();
        assert_eq!(found, vec![2, 5, 6]);
        assert!(Expr::True.inputs().size() == 0);
    }

    #[test]
    fn equality_is_zero_extended() {
        let e = Expr::equality(Expr::ident(&OffsetGroup::new(0, 4)), Expr::constant(0x3, 8));
        assert!(e.evaluate_logic(&inputs(0x3, 4)));
        assert!(!e.evaluate_logic(&inputs(0x7, 4)));
        let ne = Expr::not_equal(Expr::ident(&OffsetGroup::new(0, 4)), Expr::constant(0x3, 2));
        assert!(!ne.evaluate_logic(&inputs(0x3, 4)));
        assert!(ne.evaluate_logic(&inputs(0xb, 4)));
    }

    #[test]
    fn reductions() {
        let x = || Box::new(Expr::ident(&OffsetGroup::new(0, 3)));
        assert!(Expr::ReduceAnd(x()).evaluate_logic(&inputs(0b111, 3)));
        assert!(!Expr::ReduceAnd(x()).evaluate_logic(&inputs(0b101, 3)));
        assert!(Expr::ReduceXor(x()).evaluate_logic(&inputs(0b100, 3)));
        assert!(!Expr::ReduceXor(x()).evaluate_logic(&inputs(0b101, 3)));
        assert!(!Expr::ReduceOr(x()).evaluate_logic(&inputs(0, 3)));
    }

    #[test]
    fn bitwise_broadcasts_to_wider_operand() {
        let narrow = || Box::new(Expr::constant(0b1, 1));
        let wide = || Box::new(Expr::constant(0b0101, 4));
        let none = DynamicBitmask::new();
        assert_eq!(Expr::And(narrow(), wide()).evaluate(&none), inputs(0b0001, 4));
        assert_eq!(Expr::Or(narrow(), wide()).evaluate(&none), inputs(0b0101, 4));
        assert_eq!(Expr::Xor(narrow(), wide()).evaluate(&none), inputs(0b0100, 4));
        // xnor: missing bits read as one
        let xnor = Expr::Xnor(narrow(), wide()).evaluate(&none);
        assert_eq!(xnor.size(), 4);
        assert_eq!(xnor, inputs(0b0101, 4));
    }

    #[test]
    fn bitwise_not_keeps_width() {
        let e = Expr::Not(Box::new(Expr::constant(0b01, 2)));
        let v = e.evaluate(&DynamicBitmask::new());
        assert_eq!(v.size(), 2);
        assert_eq!(v, inputs(0b10, 2));
    }

    #[test]
    fn constant_solve_literals_and_combinations() {
        assert_eq!(Expr::True.constant_solve(), Some(true));
        assert_eq!(Expr::logic_not(Expr::False).constant_solve(), Some(true));
        let x = Expr::input(0);
        assert_eq!(Expr::logic_or(Expr::True, x.clone()).constant_solve(), Some(true));
        assert_eq!(Expr::logic_and(x.clone(), Expr::False).constant_solve(), Some(false));
        assert_eq!(Expr::logic_or(Expr::False, x.clone()).constant_solve(), None);
        assert_eq!(Expr::logic_and(Expr::True, Expr::True).constant_solve(), Some(true));
        assert_eq!(Expr::ReduceOr(Box::new(Expr::constant(0, 4))).constant_solve(), Some(false));
        assert_eq!(Expr::equality(x.clone(), x).constant_solve(), None);
    }

    #[test]
    fn clone_drops_neutral_operands() {
        let x = Expr::logic_not(Expr::input(1));
        assert_eq!(Expr::logic_or(Expr::False, x.clone()).clone(), x);
        assert_eq!(Expr::logic_or(x.clone(), Expr::False).clone(), x);
        assert_eq!(Expr::logic_and(Expr::True, x.clone()).clone(), x);
        assert_eq!(Expr::logic_and(x.clone(), Expr::True).clone(), x);
    }

    #[test]
    fn clone_collapses_negation_chains() {
        let base = Expr::ReduceXor(Box::new(Expr::input(0)));
        let twice = Expr::logic_not(Expr::logic_not(base.clone()));
        assert_eq!(twice.clone(), base);
        let thrice = Expr::logic_not(twice);
        assert_eq!(thrice.clone(), Expr::LogicNot(Box::new(base)));
    }

    #[test]
    fn clone_unwraps_reduce_or_of_boolean() {
        let inner = Expr::equality(Expr::input(0), Expr::input(1));
        assert_eq!(Expr::ReduceOr(Box::new(inner.clone())).clone(), inner);
        let vec = Expr::ReduceOr(Box::new(Expr::input(0)));
        assert_eq!(vec.clone(), vec);
    }

    #[test]
    fn clone_folds_compare_against_literal() {
        let x = Expr::ReduceOr(Box::new(Expr::input(4)));
        assert_eq!(Expr::equality(x.clone(), Expr::True).clone(), x);
        assert_eq!(
            Expr::equality(Expr::False, x.clone()).clone(),
            Expr::LogicNot(Box::new(x.clone()))
        );
        assert_eq!(
            Expr::equality(Expr::logic_not(x.clone()), Expr::False).clone(),
            x
        );
        assert_eq!(Expr::not_equal(x.clone(), Expr::False).clone(), x);
    }

    #[test]
    fn display_strings() {
        let a = Expr::input(3);
        let b = Expr::ident(&OffsetGroup::new(1, 2));
        assert_eq!(a.to_string(), "I3");
        assert_eq!(b.to_string(), "I{1,2}");
        assert_eq!(Expr::equality(a.clone(), b.clone()).to_string(), "(I3 == I{1,2})");
        assert_eq!(
            Expr::logic_and(a.clone(), Expr::logic_not(b.clone())).to_string(),
            "(|I3 && !|I{1,2})"
        );
        assert_eq!(Expr::Xnor(Box::new(a), Box::new(b)).to_string(), "(I3 ~^ I{1,2})");
        assert_eq!(Expr::constant(0x5a, 8).to_string(), "8'h5a");
        assert_eq!(Expr::True.to_string(), "true");
    }

    #[test]
    fn serde_roundtrip() {
        let e = Expr::logic_or(
            Expr::equality(Expr::input(0), Expr::constant(1, 1)),
            Expr::ReduceAnd(Box::new(Expr::input(2))),
        );
        let json = serde_json::to_string(&e).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const WIDTH: usize = 6;

    fn arb_vector() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![
            (0..WIDTH).prop_map(Expr::input),
            (0..WIDTH, 1..=3usize).prop_map(|(start, len)| {
                let idx = (0..len).map(|i| (start + i) % WIDTH).collect();
                Expr::Identifier(MappedGroup::from_indices(idx))
            }),
            (any::<u64>(), 1..=4usize).prop_map(|(v, w)| Expr::constant(v & 0xf, w)),
        ];
        leaf.prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::And(Box::new(a), Box::new(b))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Or(Box::new(a), Box::new(b))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Xor(Box::new(a), Box::new(b))),
                (inner.clone(), inner).prop_map(|(a, b)| Expr::Xnor(Box::new(a), Box::new(b))),
            ]
        })
    }

    fn arb_logic() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![
            Just(Expr::True),
            Just(Expr::False),
            arb_vector().prop_map(|e| Expr::ReduceOr(Box::new(e))),
            arb_vector().prop_map(|e| Expr::ReduceAnd(Box::new(e))),
            arb_vector().prop_map(|e| Expr::ReduceXor(Box::new(e))),
            (arb_vector(), arb_vector()).prop_map(|(a, b)| Expr::equality(a, b)),
        ];
        leaf.prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| Expr::LogicNot(Box::new(e))),
                inner.clone().prop_map(|e| Expr::ReduceOr(Box::new(e))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::logic_and(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::logic_or(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::equality(a, b)),
                (inner.clone(), inner).prop_map(|(a, b)| Expr::not_equal(a, b)),
            ]
        })
    }

    proptest! {
        #[test]
        fn clone_preserves_behavior(e in arb_logic(), v in 0u64..(1 << WIDTH)) {
            let inp = DynamicBitmask::from_u64(v, WIDTH);
            let c = e.clone();
            prop_assert_eq!(c.evaluate_logic(&inp), e.evaluate_logic(&inp));
        }

        #[test]
        fn clone_preserves_vector_values(e in arb_vector(), v in 0u64..(1 << WIDTH)) {
            let inp = DynamicBitmask::from_u64(v, WIDTH);
            prop_assert_eq!(e.clone().evaluate(&inp), e.evaluate(&inp));
        }

        #[test]
        fn and_false_and_or_true_fold(x in arb_logic()) {
            prop_assert_eq!(Expr::logic_and(Expr::False, x.clone()).constant_solve(), Some(false));
            prop_assert_eq!(Expr::logic_and(x.clone(), Expr::False).constant_solve(), Some(false));
            prop_assert_eq!(Expr::logic_or(Expr::True, x.clone()).constant_solve(), Some(true));
            prop_assert_eq!(Expr::logic_or(x, Expr::True).constant_solve(), Some(true));
        }

        #[test]
        fn constant_solve_is_sound(e in arb_logic(), v in 0u64..(1 << WIDTH)) {
            if let Some(value) = e.constant_solve() {
                let inp = DynamicBitmask::from_u64(v, WIDTH);
                prop_assert_eq!(e.evaluate_logic(&inp), value);
            }
        }
    }
}
