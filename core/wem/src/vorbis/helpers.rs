//! Integer helpers from the Vorbis I bitstream definitions.

/// Bits needed to store `v`: 0 for 0, otherwise `floor(log2(v)) + 1`.
#[inline]
pub fn ilog(v: u32) -> u8 {
    (u32::BITS - v.leading_zeros()) as u8
}

/// Number of quantized values for a type 1 lookup table: the largest `v`
/// with `v^dimensions <= entries`.
pub fn book_map_type1_quantvals(entries: u32, dimensions: u32) -> u32 {
    if dimensions == 0 || entries == 0 {
        return 0;
    }

    let fits = |v: u32| {
        (v as u64)
            .checked_pow(dimensions)
            .is_some_and(|p| p <= entries as u64)
    };

    // Same search as the decoders: an estimate from the bit length, then step
    let bits = ilog(entries) as u32;
    let mut vals = entries >> ((bits - 1) * (dimensions - 1) / dimensions);
    loop {
        match (fits(vals), vals.checked_add(1).is_some_and(fits)) {
            (true, false) => return vals,
            (false, _) => vals -= 1,
            (true, true) => vals += 1,
        }
    }
}
