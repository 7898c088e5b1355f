/*
 * Architecture Abstraction Layer
 *
 * Architecture-specific backends for the timer's collaborator traits.
 * Currently only x86_64 (8259 PIC, IF-flag masking).
 */

#[cfg(target_arch = "x86_64")]
pub mod x86_64;
