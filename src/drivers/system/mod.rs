/*
 * System Controller Drivers
 *
 * Drivers for the two legacy controllers the timer sits on: the 8259 PIC
 * pair that routes IRQ0, and the 8254 PIT that generates it.
 */

pub mod pic;
pub mod pit;

/// Initialize system controllers
///
/// The PIT is programmed later, by `timer_init`.
pub fn init() {
    pic::init_pic();
    log::info!("PIC initialization complete");
}
