use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::instructions::port::Port;

/// Master PIC starts at interrupt 32
pub const PIC_1_OFFSET: u8 = 0x20;

/// Slave PIC starts at interrupt 40
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

const PIC_1_DATA: u16 = 0x21;
const PIC_2_DATA: u16 = 0xA1;

/// Cascade line on the master PIC
const CASCADE_IRQ: u8 = 2;

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Initialize the Programmable Interrupt Controller (PIC)
///
/// Remaps IRQ0-15 to vectors 0x20-0x2F and masks every line; lines are
/// unmasked as handlers get registered.
pub fn init_pic() {
    unsafe {
        PICS.lock().initialize();

        Port::<u8>::new(PIC_1_DATA).write(0xFF);
        Port::<u8>::new(PIC_2_DATA).write(0xFF);
    }
    log::info!(
        "PIC remapped to {:#x}/{:#x}, all lines masked",
        PIC_1_OFFSET,
        PIC_2_OFFSET
    );
}

/// Unmask one IRQ line (0-15)
pub fn unmask_irq(irq: u8) {
    let (port, bit) = if irq < 8 {
        (PIC_1_DATA, irq)
    } else {
        (PIC_2_DATA, irq - 8)
    };

    unsafe {
        let mut data = Port::<u8>::new(port);
        let mask: u8 = data.read();
        data.write(mask & !(1 << bit));

        // Slave lines only reach the CPU through the cascade
        if irq >= 8 {
            let mut master = Port::<u8>::new(PIC_1_DATA);
            let mask: u8 = master.read();
            master.write(mask & !(1 << CASCADE_IRQ));
        }
    }
}

/// Send End of Interrupt (EOI) for `vector`
pub fn end_of_interrupt(vector: u8) {
    let mut pics = PICS.lock();
    if pics.handles_interrupt(vector) {
        unsafe { pics.notify_end_of_interrupt(vector) };
    }
}
