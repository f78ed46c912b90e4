//! Generic algorithms over ordered sequences
//!
//! Set algebra and ordering checks for sorted streams, written against
//! plain iterators with an explicit comparator so they compose with any
//! container in this crate (or the standard library). Each input must be
//! strictly ascending under the supplied comparator — exactly what the
//! ordered containers' iterators produce.
//!
//! Capability requirements are ordinary trait bounds: single-pass
//! algorithms take any [`Iterator`], and nothing here needs more than that.

use crate::compare::Compare;
use std::cmp::Ordering;

/// Whether `iter` is sorted (non-decreasing) under `cmp`.
///
/// # Examples
///
/// ```rust
/// use sequora::algorithms::is_sorted_by;
/// use sequora::Natural;
///
/// assert!(is_sorted_by([1, 2, 2, 3], &Natural));
/// assert!(!is_sorted_by([2, 1], &Natural));
/// ```
pub fn is_sorted_by<I, C>(iter: I, cmp: &C) -> bool
where
    I: IntoIterator,
    C: Compare<I::Item>,
{
    let mut iter = iter.into_iter();
    let mut prev = match iter.next() {
        Some(first) => first,
        None => return true,
    };
    for item in iter {
        if cmp.compare(&prev, &item) == Ordering::Greater {
            return false;
        }
        prev = item;
    }
    true
}

/// Whether two sequences are elementwise equal under `cmp`.
pub fn equal_by<A, B, C>(a: A, b: B, cmp: &C) -> bool
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    C: Compare<A::Item>,
{
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if cmp.compare(&x, &y) != Ordering::Equal {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Elements present in either sorted input, each distinct element once.
///
/// # Examples
///
/// ```rust
/// use sequora::algorithms::union_sorted;
/// use sequora::Natural;
///
/// let joined = union_sorted([1, 3, 5], [2, 3, 6], &Natural);
/// assert_eq!(joined, [1, 2, 3, 5, 6]);
/// ```
pub fn union_sorted<A, B, C>(a: A, b: B, cmp: &C) -> Vec<A::Item>
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    C: Compare<A::Item>,
{
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    let mut out = Vec::new();
    loop {
        let ord = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => cmp.compare(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match ord {
            Ordering::Less => out.push(a.next().unwrap()),
            Ordering::Greater => out.push(b.next().unwrap()),
            Ordering::Equal => {
                out.push(a.next().unwrap());
                b.next();
            }
        }
    }
    out
}

/// Elements present in both sorted inputs.
pub fn intersection_sorted<A, B, C>(a: A, b: B, cmp: &C) -> Vec<A::Item>
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    C: Compare<A::Item>,
{
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    let mut out = Vec::new();
    while let (Some(x), Some(y)) = (a.peek(), b.peek()) {
        match cmp.compare(x, y) {
            Ordering::Less => {
                a.next();
            }
            Ordering::Greater => {
                b.next();
            }
            Ordering::Equal => {
                out.push(a.next().unwrap());
                b.next();
            }
        }
    }
    out
}

/// Elements of the first sorted input absent from the second.
pub fn difference_sorted<A, B, C>(a: A, b: B, cmp: &C) -> Vec<A::Item>
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    C: Compare<A::Item>,
{
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    let mut out = Vec::new();
    loop {
        let ord = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => cmp.compare(x, y),
            (Some(_), None) => Ordering::Less,
            _ => break,
        };
        match ord {
            Ordering::Less => out.push(a.next().unwrap()),
            Ordering::Greater => {
                b.next();
            }
            Ordering::Equal => {
                a.next();
                b.next();
            }
        }
    }
    out
}

/// Elements present in exactly one of the sorted inputs.
pub fn symmetric_difference_sorted<A, B, C>(a: A, b: B, cmp: &C) -> Vec<A::Item>
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    C: Compare<A::Item>,
{
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    let mut out = Vec::new();
    loop {
        let ord = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => cmp.compare(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match ord {
            Ordering::Less => out.push(a.next().unwrap()),
            Ordering::Greater => out.push(b.next().unwrap()),
            Ordering::Equal => {
                a.next();
                b.next();
            }
        }
    }
    out
}
