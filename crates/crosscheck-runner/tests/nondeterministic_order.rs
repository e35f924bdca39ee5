//! Nondeterminism tolerance: a candidate container that iterates in a
//! different (but legal) order than the model must not be flagged, while a
//! cursor that actually misbehaves must be.
//!
//! The reference cursor tracks every traversal order still consistent with
//! what the candidate has produced so far; each `next` offers the set of
//! acceptable heads and a notifier prunes the orders when the answer is
//! fixed.

use crosscheck_oracle::{
    call0_obj, call0_raw, call1, construct0, permutations, Outcome, Scalar, Shared,
};
use crosscheck_runner::{Driver, HangPolicy, RunConfig, Verdict};
use rand::Rng;
use std::rc::Rc;

#[derive(Default)]
struct RefBag {
    items: Vec<i64>,
}

impl RefBag {
    fn insert(&mut self, value: i64) -> bool {
        if self.items.contains(&value) {
            false
        } else {
            self.items.push(value);
            true
        }
    }
}

/// Candidate bag; iterates in reverse insertion order, which is legal.
#[derive(Default)]
struct SutBag {
    items: Vec<i64>,
}

impl SutBag {
    fn insert(&mut self, value: i64) -> bool {
        if self.items.contains(&value) {
            false
        } else {
            self.items.push(value);
            true
        }
    }
}

/// Model cursor: any order of the snapshot is acceptable until the
/// candidate's answers narrow it down.
struct RefCursor {
    orders: Vec<Vec<i64>>,
    taken: usize,
}

impl RefCursor {
    fn over(items: Vec<i64>) -> Self {
        Self {
            orders: permutations(&items),
            taken: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.orders.iter().all(|order| order.len() <= self.taken)
    }

    fn next_possibilities(&self) -> Vec<i64> {
        let mut heads: Vec<i64> = self
            .orders
            .iter()
            .filter_map(|order| order.get(self.taken).copied())
            .collect();
        heads.sort_unstable();
        heads.dedup();
        heads
    }

    fn advance(&mut self, chosen: i64) {
        let taken = self.taken;
        self.orders
            .retain(|order| order.get(taken).copied() == Some(chosen));
        self.taken += 1;
    }
}

struct SutCursor {
    items: Vec<i64>,
    pos: usize,
}

impl SutCursor {
    fn next(&mut self) -> Option<i64> {
        let item = self.items.get(self.pos).copied();
        self.pos += 1;
        item
    }
}

/// Candidate cursor that keeps yielding the first element.
struct StuckCursor {
    items: Vec<i64>,
}

impl StuckCursor {
    fn next(&mut self) -> Option<i64> {
        self.items.first().copied()
    }
}

fn model_next(cursor: &Shared<RefCursor>) -> Outcome {
    let (possibilities, done) = {
        let current = cursor.borrow();
        (current.next_possibilities(), current.exhausted())
    };
    if done {
        return Outcome::normal(None::<i64>);
    }
    let model = Rc::clone(cursor);
    Outcome::choice_with(
        possibilities
            .into_iter()
            .map(|v| Scalar::some(Scalar::Int(v)))
            .collect(),
        Some(Box::new(move |chosen: &Scalar| {
            if let Scalar::Opt(Some(inner)) = chosen {
                if let Scalar::Int(v) = inner.as_ref() {
                    model.borrow_mut().advance(*v);
                }
            }
        })),
    )
}

fn config(seed: u64) -> RunConfig {
    RunConfig {
        command_budget: 400,
        initial_sequence_len: 8,
        max_sequence_len: 8,
        step_timeout_ms: 1_000,
        hang_policy: HangPolicy::Record,
        seed: Some(seed),
    }
}

#[test]
fn reversed_iteration_order_is_not_a_divergence() {
    let mut driver = Driver::new(config(41)).expect("valid config");
    let bags = driver.register_class::<RefBag, SutBag>("Bag", "b");
    let cursors = driver.register_class::<RefCursor, SutCursor>("Cursor", "it");

    let report = driver.run(move |rng, reg| {
        let bag_count = reg.instance_count(bags.id());
        let cursor_count = reg.instance_count(cursors.id());
        if bag_count == 0 {
            return construct0(bags, RefBag::default, SutBag::default);
        }
        match rng.gen_range(0..4) {
            0 | 1 => {
                let value = rng.gen_range(0..5i64);
                call1(
                    bags,
                    rng.gen_range(0..bag_count),
                    "insert",
                    value,
                    |b: &mut RefBag, v: &i64| b.insert(*v),
                    |b: &mut SutBag, v: &i64| b.insert(*v),
                )
            }
            2 => call0_obj(
                bags,
                rng.gen_range(0..bag_count),
                cursors,
                "cursor",
                |b: &Shared<RefBag>| {
                    crosscheck_oracle::share(RefCursor::over(b.borrow().items.clone()))
                },
                |b: &Shared<SutBag>| {
                    let mut items = b.borrow().items.clone();
                    items.reverse();
                    crosscheck_oracle::share(SutCursor { items, pos: 0 })
                },
            ),
            _ if cursor_count > 0 => call0_raw(
                cursors,
                rng.gen_range(0..cursor_count),
                "next",
                model_next,
                |c: &Shared<SutCursor>| Outcome::normal(c.borrow_mut().next()),
            ),
            _ => call1(
                bags,
                rng.gen_range(0..bag_count),
                "insert",
                rng.gen_range(0..5i64),
                |b: &mut RefBag, v: &i64| b.insert(*v),
                |b: &mut SutBag, v: &i64| b.insert(*v),
            ),
        }
    });

    assert_eq!(report.verdict, Verdict::Passed);
}

#[test]
fn stuck_cursor_is_caught() {
    let mut driver = Driver::new(config(42)).expect("valid config");
    let bags = driver.register_class::<RefBag, SutBag>("Bag", "b");
    let cursors = driver.register_class::<RefCursor, StuckCursor>("Cursor", "it");

    let report = driver.run(move |rng, reg| {
        let bag_count = reg.instance_count(bags.id());
        let cursor_count = reg.instance_count(cursors.id());
        if bag_count == 0 {
            return construct0(bags, RefBag::default, SutBag::default);
        }
        match rng.gen_range(0..3) {
            0 => {
                let value = rng.gen_range(0..4i64);
                call1(
                    bags,
                    rng.gen_range(0..bag_count),
                    "insert",
                    value,
                    |b: &mut RefBag, v: &i64| b.insert(*v),
                    |b: &mut SutBag, v: &i64| b.insert(*v),
                )
            }
            1 => call0_obj(
                bags,
                rng.gen_range(0..bag_count),
                cursors,
                "cursor",
                |b: &Shared<RefBag>| {
                    crosscheck_oracle::share(RefCursor::over(b.borrow().items.clone()))
                },
                |b: &Shared<SutBag>| {
                    crosscheck_oracle::share(StuckCursor {
                        items: b.borrow().items.clone(),
                    })
                },
            ),
            _ if cursor_count > 0 => call0_raw(
                cursors,
                rng.gen_range(0..cursor_count),
                "next",
                model_next,
                |c: &Shared<StuckCursor>| Outcome::normal(c.borrow_mut().next()),
            ),
            _ => construct0(bags, RefBag::default, SutBag::default),
        }
    });

    // A cursor that repeats an element (or never ends) must eventually
    // disagree with every traversal order the model still accepts.
    assert_eq!(report.verdict, Verdict::Diverged);
    // The cursor variable the failing assertion uses was declared earlier
    // in the emitted test.
    let last = report.statements.last().expect("statements recorded");
    assert!(last.contains(".next()"));
    assert!(report
        .statements
        .iter()
        .any(|s| s.contains("let mut it") && s.contains(".cursor()")));
}
