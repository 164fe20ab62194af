//! Holder sampling (spec §4.5.2): above `sampleSize`, keep the top 40% by
//! balance, bottom 10%, and a uniform random 50% of the middle, instead of
//! enriching every holder.

use crate::rpc::enrich::HolderRecord;

pub const SAMPLE_SIZE_HIGH: usize = 500;
pub const SAMPLE_SIZE_MID: usize = 250;
pub const SAMPLE_SIZE_LOW: usize = 100;

const TOP_FRACTION: f64 = 0.40;
const BOTTOM_FRACTION: f64 = 0.10;
const MIDDLE_SAMPLE_FRACTION: f64 = 0.50;

/// `holders` must already be sorted by balance descending. `random01`
/// supplies one `[0,1)` draw per middle candidate, injected so the holder
/// analyzer can pass a seeded RNG and tests can pass a deterministic one
/// (`Math.random()`-equivalents are unavailable inside the pure decision).
pub fn sample<'a>(holders: &'a [HolderRecord], sample_size: usize, mut random01: impl FnMut() -> f64) -> Vec<&'a HolderRecord> {
    if holders.len() <= sample_size {
        return holders.iter().collect();
    }

    let top_n = ((holders.len() as f64) * TOP_FRACTION).ceil() as usize;
    let bottom_n = ((holders.len() as f64) * BOTTOM_FRACTION).ceil() as usize;
    let top_n = top_n.min(holders.len());
    let bottom_n = bottom_n.min(holders.len() - top_n);

    let (top, rest) = holders.split_at(top_n);
    let middle_len = rest.len().saturating_sub(bottom_n);
    let (middle, bottom) = rest.split_at(middle_len);

    let mut sampled: Vec<&HolderRecord> = top.iter().collect();
    sampled.extend(middle.iter().filter(|_| random01() < MIDDLE_SAMPLE_FRACTION));
    sampled.extend(bottom.iter());
    sampled
}

pub fn sample_size_for(holder_count: u64) -> usize {
    if holder_count > SAMPLE_SIZE_HIGH as u64 {
        SAMPLE_SIZE_HIGH
    } else if holder_count > SAMPLE_SIZE_MID as u64 {
        SAMPLE_SIZE_MID
    } else {
        SAMPLE_SIZE_LOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holders(n: usize) -> Vec<HolderRecord> {
        (0..n)
            .map(|i| HolderRecord { wallet: format!("W{i}"), balance: (n - i) as u64, rank: Some(i as u32) })
            .collect()
    }

    #[test]
    fn below_threshold_keeps_everyone() {
        let h = holders(50);
        let sampled = sample(&h, 100, || 0.0);
        assert_eq!(sampled.len(), 50);
    }

    #[test]
    fn top_and_bottom_always_included() {
        let h = holders(1000);
        let sampled = sample(&h, 500, || 1.0); // never sample the middle
        assert!(sampled.iter().any(|r| r.wallet == "W0"));
        assert!(sampled.iter().any(|r| r.wallet == "W999"));
        assert!(sampled.len() < 1000);
    }
}
