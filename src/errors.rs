//! The error and result types used throughout the crate.

use error_chain::*;

error_chain! {
    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("maze dimensions must be odd")
            display("invalid maze dimensions {}x{}: width and height must both be odd", width, height)
        }
    }
}
