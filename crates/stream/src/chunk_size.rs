use mapedit_common::{ChunkPreference, Dimensions, GeometryError};

/// Pixel size of one chunk.
pub type ChunkSize = Dimensions;

/// How a splitter decides its chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSizeSpec {
    Fixed(ChunkSize),
    /// Derived from the surface dimensions by [`calculate_chunk_size`].
    Calculated,
}

/// Divisors of `n` in ascending order, excluding 1 and `n`.
pub fn divisors(n: u32) -> Vec<u32> {
    let mut low = Vec::new();
    let mut high = Vec::new();
    let mut d = 2u32;
    while u64::from(d) * u64::from(d) <= u64::from(n) {
        if n % d == 0 {
            low.push(d);
            let pair = n / d;
            if pair != d {
                high.push(pair);
            }
        }
        d += 1;
    }
    high.reverse();
    low.extend(high);
    low
}

/// Pick a chunk size that divides the surface evenly where possible.
///
/// Big: keep the upper half of each axis' divisors and take the one two
/// thirds of the way along, unless both sides are multiples of 1000, which
/// gives 1000x1000. Small: keep the lower half and take the first, except
/// that a side that is a multiple of 100 uses 100. A side with no usable
/// divisor (prime or tiny) becomes one chunk along that axis.
pub fn calculate_chunk_size(
    dimensions: Dimensions,
    preference: ChunkPreference,
) -> Result<ChunkSize, GeometryError> {
    let Dimensions { width, height } = dimensions.ensure_positive("surface")?;
    let size = match preference {
        ChunkPreference::Big => {
            if width % 1000 == 0 && height % 1000 == 0 {
                ChunkSize::new(1000, 1000)
            } else {
                ChunkSize::new(big_axis(width), big_axis(height))
            }
        }
        ChunkPreference::Small => ChunkSize::new(small_axis(width), small_axis(height)),
    };
    tracing::debug!(
        width,
        height,
        ?preference,
        chunk_width = size.width,
        chunk_height = size.height,
        "chunk size chosen"
    );
    Ok(size)
}

fn big_axis(n: u32) -> u32 {
    let all = divisors(n);
    let upper = &all[all.len() / 2..];
    let pick = (upper.len() as f64 / 3.0 * 2.0).round() as usize;
    match pick.checked_sub(1).and_then(|i| upper.get(i)) {
        Some(&d) => d,
        None => n,
    }
}

fn small_axis(n: u32) -> u32 {
    if n % 100 == 0 {
        return 100;
    }
    let all = divisors(n);
    let lower = &all[..all.len() / 2];
    lower.first().copied().unwrap_or(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(w: u32, h: u32) -> ChunkSize {
        calculate_chunk_size(Dimensions::new(w, h), ChunkPreference::Big).unwrap()
    }

    fn small(w: u32, h: u32) -> ChunkSize {
        calculate_chunk_size(Dimensions::new(w, h), ChunkPreference::Small).unwrap()
    }

    #[test]
    fn divisors_exclude_one_and_self() {
        assert_eq!(divisors(12), vec![2, 3, 4, 6]);
        assert_eq!(divisors(16), vec![2, 4, 8]);
        assert!(divisors(97).is_empty());
        assert!(divisors(1).is_empty());
        assert!(divisors(2).is_empty());
    }

    #[test]
    fn multiples_of_a_thousand_use_thousand_chunks() {
        assert_eq!(big(6000, 6000), ChunkSize::new(1000, 1000));
        assert_eq!(big(10_000, 8000), ChunkSize::new(1000, 1000));
    }

    #[test]
    fn big_picks_two_thirds_into_upper_divisors() {
        assert_eq!(big(1200, 900), ChunkSize::new(150, 150));
        assert_eq!(big(12, 18), ChunkSize::new(4, 6));
        assert_eq!(big(100, 80), ChunkSize::new(25, 20));
        assert_eq!(big(640, 480), ChunkSize::new(128, 80));
        // Only one side is a multiple of 1000.
        assert_eq!(big(1000, 80), ChunkSize::new(200, 20));
    }

    #[test]
    fn small_prefers_hundred_then_smallest_divisor() {
        assert_eq!(small(6000, 6000), ChunkSize::new(100, 100));
        assert_eq!(small(100, 80), ChunkSize::new(100, 2));
        assert_eq!(small(150, 77), ChunkSize::new(2, 7));
        assert_eq!(small(12, 18), ChunkSize::new(2, 2));
    }

    #[test]
    fn primes_and_tiny_sides_fall_back_to_full_dimension() {
        assert_eq!(big(97, 97), ChunkSize::new(97, 97));
        assert_eq!(small(97, 1), ChunkSize::new(97, 1));
        // 4 has one divisor; the small half of one element is empty.
        assert_eq!(small(4, 4), ChunkSize::new(4, 4));
        assert_eq!(big(4, 4), ChunkSize::new(2, 2));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(calculate_chunk_size(Dimensions::new(0, 10), ChunkPreference::Big).is_err());
    }
}
