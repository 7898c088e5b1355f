/*
 * Interrupt Management Module
 *
 * x86_64 implementation of the timer's `InterruptController`: masking via
 * the IF flag, and a small table binding external (PIC) vectors to plain
 * `fn()` handlers.
 *
 * The kernel's IDT stubs for vectors 0x20..0x30 call `dispatch_external`,
 * which runs the registered handler with the in-handler flag set and then
 * acknowledges the PIC. Handlers therefore never deal with EOI or the
 * interrupt calling convention themselves.
 */

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;
use x86_64::instructions::interrupts;

use crate::drivers::system::pic::{self, PIC_1_OFFSET};
use crate::scheduler::{IntrLevel, traits::InterruptController};

/// Number of external vectors (two cascaded 8259s)
const EXTERNAL_VECTORS: usize = 16;

#[derive(Clone, Copy)]
struct ExternalHandler {
    handler: fn(),
    name: &'static str,
}

static EXTERNAL_HANDLERS: Mutex<[Option<ExternalHandler>; EXTERNAL_VECTORS]> =
    Mutex::new([None; EXTERNAL_VECTORS]);

/// Set while `dispatch_external` is running a handler
static IN_EXTERNAL: AtomicBool = AtomicBool::new(false);

/// Enable interrupts globally
///
/// Should only be called after the IDT has been properly initialized.
pub fn enable() {
    interrupts::enable();
}

/// Disable interrupts globally
pub fn disable() {
    interrupts::disable();
}

/// Check if interrupts are enabled
pub fn are_enabled() -> bool {
    interrupts::are_enabled()
}

fn slot(vector: u8) -> Option<usize> {
    let index = vector.checked_sub(PIC_1_OFFSET)? as usize;
    (index < EXTERNAL_VECTORS).then_some(index)
}

/// Run the handler registered for `vector` and acknowledge the PIC
///
/// Called by the kernel's IDT stub with interrupts masked.
pub fn dispatch_external(vector: u8) {
    let entry = slot(vector).and_then(|i| EXTERNAL_HANDLERS.lock()[i]);

    IN_EXTERNAL.store(true, Ordering::SeqCst);
    match entry {
        Some(entry) => (entry.handler)(),
        None => log::warn!("unexpected external interrupt {:#x}", vector),
    }
    IN_EXTERNAL.store(false, Ordering::SeqCst);

    pic::end_of_interrupt(vector);
}

/// Name a vector's handler was registered under
pub fn handler_name(vector: u8) -> Option<&'static str> {
    slot(vector).and_then(|i| EXTERNAL_HANDLERS.lock()[i].map(|e| e.name))
}

/// The CPU's interrupt controller as seen by the timer
pub struct X86Interrupts;

impl InterruptController for X86Interrupts {
    fn disable(&self) -> IntrLevel {
        let level = self.level();
        disable();
        level
    }

    fn restore(&self, level: IntrLevel) {
        match level {
            IntrLevel::On => enable(),
            IntrLevel::Off => disable(),
        }
    }

    fn level(&self) -> IntrLevel {
        IntrLevel::from_enabled(are_enabled())
    }

    fn in_external_handler(&self) -> bool {
        IN_EXTERNAL.load(Ordering::SeqCst)
    }

    fn register_external_handler(&self, vector: u8, handler: fn(), name: &'static str) {
        let Some(index) = slot(vector) else {
            panic!("vector {:#x} is not an external interrupt", vector);
        };

        let mut table = EXTERNAL_HANDLERS.lock();
        debug_assert!(
            table[index].is_none(),
            "vector {:#x} already has a handler",
            vector
        );
        table[index] = Some(ExternalHandler { handler, name });
        drop(table);

        pic::unmask_irq(index as u8);
        log::info!("Registered '{}' on vector {:#x}", name, vector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_vector_slots() {
        assert_eq!(slot(0x20), Some(0));
        assert_eq!(slot(0x2F), Some(15));
        assert_eq!(slot(0x1F), None);
        assert_eq!(slot(0x30), None);
    }

    #[test]
    fn test_unregistered_vector_has_no_name() {
        assert_eq!(handler_name(0x2E), None);
        assert_eq!(handler_name(0x80), None);
    }
}
