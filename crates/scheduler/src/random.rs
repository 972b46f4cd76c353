//! Stateless keyed pseudo-random numbers.
//!
//! Every value is a pure function of its key, so a frame can be evaluated in
//! any order and still see the same layout. The key is folded with the classic
//! `h * 31 + c` string hash over UTF-16 code units and the hash seeds a single
//! Mulberry32 step.

/// Returns a well-distributed value in `[0, 1)` for `key`.
pub fn random(key: &str) -> f64 {
    mulberry32(hash_key(key))
}

fn hash_key(key: &str) -> u32 {
    key.encode_utf16().fold(0u32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(u32::from(unit))
    })
}

fn mulberry32(seed: u32) -> f64 {
    let mut t = seed.wrapping_add(0x6d2b_79f5);
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    f64::from(t ^ (t >> 14)) / 4_294_967_296.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_string_hash_code() {
        assert_eq!(hash_key(""), 0);
        assert_eq!(hash_key("a"), 97);
        assert_eq!(hash_key("xdelay-0"), 234_189_550);
        assert_eq!(hash_key("xdelay-68"), 2_964_908_996);
    }

    #[test]
    fn reproduces_reference_values() {
        assert_eq!(random("xdelay-0"), 0.16069347807206213);
        assert_eq!(random("xdelay-1"), 0.9638787056319416);
        assert_eq!(random("xdelay-68"), 0.042152772191911936);
    }

    #[test]
    fn same_key_same_value() {
        for index in 0..100 {
            let key = format!("xdelay-{index}");
            assert_eq!(random(&key).to_bits(), random(&key).to_bits());
        }
    }

    #[test]
    fn stays_in_unit_interval() {
        for index in 0..10_000 {
            let value = random(&format!("range-{index}"));
            assert!((0.0..1.0).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn spreads_across_the_interval() {
        let mut buckets = [0usize; 10];
        for index in 0..10_000 {
            let value = random(&format!("spread-{index}"));
            buckets[(value * 10.0) as usize] += 1;
        }
        for (bucket, hits) in buckets.iter().enumerate() {
            assert!(*hits > 700, "bucket {bucket} only received {hits} samples");
        }
    }
}
