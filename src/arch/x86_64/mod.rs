/*
 * x86_64 Architecture Support Module
 *
 * Submodules:
 * - interrupts: interrupt masking and external handler dispatch
 */

pub mod interrupts;

pub use interrupts::{X86Interrupts, dispatch_external};
