#[macro_export]
macro_rules! init {
    () => {
        #[cfg(feature = "RTT")]
        rtt_target::rtt_init_print!();
    };
}

/// Debug output. Compiles to nothing unless `RTT` or `QEMU` is enabled, in
/// which case the arguments are formatted on the target.
#[macro_export]
macro_rules! println {
    ($($arg:tt)*) => {{
        #[cfg(feature = "RTT")]
        rtt_target::rprintln!($($arg)*);

        #[cfg(feature = "QEMU")]
        cortex_m_semihosting::hprintln!($($arg)*);

        #[cfg(not(any(feature = "RTT", feature = "QEMU")))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[allow(unused)]
#[macro_export]
macro_rules! exit {
    () => {
        #[cfg(feature = "QEMU")]
        cortex_m_semihosting::debug::exit(cortex_m_semihosting::debug::EXIT_SUCCESS);
    };
}

#[allow(unused)]
pub use crate::{exit, init, println};
