/*
 * Hardware Drivers
 *
 * Driver categories:
 * - System: PIC and PIT
 */

pub mod system;
