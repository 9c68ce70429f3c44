/// Smallest power of two not less than `val`. `clp2(0) == 1`.
pub const fn clp2(val: usize) -> usize {
    if val <= 1 {
        1
    } else {
        val.next_power_of_two()
    }
}

/// Integer base-2 logarithm, rounded down. `log2(0) == 0`.
pub const fn log2(val: usize) -> u8 {
    if val == 0 {
        0
    } else {
        (usize::BITS - 1 - val.leading_zeros()) as u8
    }
}

pub const fn is_pow2(val: usize) -> bool {
    val != 0 && val & (val - 1) == 0
}
