use std::ops::Sub;

/// `a - b`, clamped to zero instead of going negative.
pub fn saturating_sub<T>(a: T, b: T) -> T
where
    T: PartialOrd + Sub<Output = T> + Default,
{
    if a > b {
        a - b
    } else {
        T::default()
    }
}

pub fn max<T: Ord>(a: T, b: T) -> T {
    std::cmp::max(a, b)
}
