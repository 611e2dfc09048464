#![no_main]

use libfuzzer_sys::fuzz_target;
use z80_core::{FlatBus, InterruptMode, Processor, ProcessorConfig};

const MAX_STEPS: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let Some((&control, image)) = data.split_first() else {
        return;
    };

    let mut bus = FlatBus::new();
    bus.load(0x0000, image);
    bus.set_acknowledge_byte(Some(control));

    let config = ProcessorConfig {
        tracing_enabled: false,
        reset_interrupt_mode: InterruptMode::from_number(control % 3).unwrap_or_default(),
    };
    let mut cpu = Processor::with_config(bus, config);
    cpu.registers_mut().set_i(control);

    for step in 0..MAX_STEPS {
        // Toggle the lines from the control byte so every arbitration path runs.
        cpu.set_int_line(control & 0x01 != 0 && step % 64 == 0);
        cpu.set_nmi_line(control & 0x02 != 0 && step % 512 == 0);
        if control & 0x04 != 0 && step == MAX_STEPS / 2 {
            cpu.request_reset();
        }
        if cpu.step().is_err() {
            break;
        }
    }
});
