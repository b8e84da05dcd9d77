// Licensed under the Apache-2.0 license

#![no_std]
#![no_main]

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{NVIC, SYST};
use cortex_m_rt::{entry, exception};
use embedded_io::Write;
use panic_halt as _;

use mbsoc_ddk::common::{Logger, UartLogger};
use mbsoc_ddk::gcnt::GlobalCounter;
use mbsoc_ddk::i2c::bus::BusController;
use mbsoc_ddk::i2c::common::{I2cConfigBuilder, I2cSpeed};
use mbsoc_ddk::i2c::i2c_controller::I2cController;
use mbsoc_ddk::ina219::{self, Ina219};
use mbsoc_ddk::mbsoc::{CounterMmio, I2cMmio, Leds, Uart, CPU_CLOCK_HZ, I2C_IRQ};
use mbsoc_ddk::timer::{timeout_in_ms, TickSource, TimerId, TimerMode, TimerService, TICK_HZ};

#[cfg(feature = "test-timer")]
use mbsoc_ddk::tests::functional::timer_test::run_timer_tests;

static TIMERS: TimerService = TimerService::new();
static I2C_BUS: BusController<I2cMmio> = BusController::new(I2cMmio::board());
static COUNTER: GlobalCounter<CounterMmio> =
    GlobalCounter::with_clock_hz(CounterMmio::board(), CPU_CLOCK_HZ);
static LEDS: Leds = Leds::board();

const HEARTBEAT: TimerId = TimerId::new(0);
const INA219_DEADLINE: TimerId = TimerId::new(1);

const SAMPLE_PERIOD_MS: u32 = 200;

struct SysTickSource(SYST);

impl TickSource for SysTickSource {
    fn start(&mut self) {
        let syst = &mut self.0;
        syst.set_reload(CPU_CLOCK_HZ / TICK_HZ - 1);
        syst.clear_current();
        syst.set_clock_source(SystClkSource::Core);
        syst.enable_interrupt();
        syst.enable_counter();
    }
}

#[derive(Clone, Copy)]
struct I2cIrq;

// SAFETY: the I2C core is wired to a valid external interrupt line.
unsafe impl InterruptNumber for I2cIrq {
    #[allow(clippy::cast_sign_loss)]
    fn number(self) -> u16 {
        I2C_IRQ as u16
    }
}

#[exception]
fn SysTick() {
    TIMERS.on_tick();
}

#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    if irqn == I2C_IRQ {
        I2C_BUS.on_interrupt();
    }
}

fn heartbeat(_data: usize) {
    LEDS.set(LEDS.get().wrapping_add(1));
}

#[entry]
fn main() -> ! {
    let peripherals = cortex_m::Peripherals::take().unwrap();

    let mut uart = Uart::board();
    write!(uart, "\r\n\r\n").unwrap();

    let mut log = UartLogger::new(Uart::board(), &COUNTER);
    log.debug(format_args!("CPU/IO Freq: {} MHz", CPU_CLOCK_HZ / 1_000_000));
    log.debug(format_args!("mbsoc starting..."));

    TIMERS.init(&mut SysTickSource(peripherals.SYST));
    TIMERS.arm(HEARTBEAT, TimerMode::Periodic, heartbeat, 0);
    TIMERS.set(HEARTBEAT, timeout_in_ms(250));

    let config = I2cConfigBuilder::new()
        .clock_hz(CPU_CLOCK_HZ)
        .speed(I2cSpeed::Fast)
        .build();
    I2C_BUS.init(&config);

    // SAFETY: handlers and the state they touch are initialised above.
    unsafe {
        NVIC::unmask(I2cIrq);
        cortex_m::interrupt::enable();
    }

    #[cfg(feature = "test-timer")]
    run_timer_tests(&mut uart, &TIMERS, &COUNTER);

    let i2c = I2cController::new(
        &I2C_BUS,
        &TIMERS,
        INA219_DEADLINE,
        timeout_in_ms(ina219::TIMEOUT_MS),
        UartLogger::new(Uart::board(), &COUNTER),
    );
    let mut ina = Ina219::with_logger(i2c, ina219::DEFAULT_ADDRESS, log);

    if ina.init().is_err() {
        ina.logger.debug(format_args!("ina219_init failed"));
    }

    match ina.registers() {
        Ok(regs) => {
            ina.logger.debug(format_args!("reg: value"));
            for (reg, value) in regs.iter().enumerate() {
                ina.logger.debug(format_args!("{reg:>3}: 0x{value:04x}"));
            }
        }
        Err(e) => ina.logger.error(format_args!("ina219 register dump: {e:?}")),
    }

    ina.logger.debug(format_args!("system init complete"));
    loop {
        match ina.sample() {
            Ok(s) => ina.logger.debug(format_args!(
                "bus (mV): {} \tshunt (uV): {} \tcurrent (uA): {} \tpower (mW): {}",
                s.bus_mv, s.shunt_uv, s.current_ua, s.power_mw
            )),
            Err(e) => ina.logger.error(format_args!("ina219 sample: {e:?}")),
        }
        COUNTER.delay_ms(SAMPLE_PERIOD_MS);
    }
}
