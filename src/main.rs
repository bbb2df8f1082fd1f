//! Tiny Display kernel
//!
//! Boots through `bootloader_api`, brings up serial logging, the heap and
//! the text console, then lets the mode selector choose between text mode
//! and the linear framebuffer. In graphics mode a small desktop is composed
//! and republished every frame.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(target_os = "none")]
mod kernel {
    use bootloader_api::config::Mapping;
    use bootloader_api::{entry_point, BootInfo, BootloaderConfig};
    use core::panic::PanicInfo;
    use core::sync::atomic::AtomicBool;
    use tiny_display::constants::HEAP_SIZE;
    use tiny_display::display;
    use tiny_display::framebuffer::{
        Canvas, Compositor, LegacyBios, ModeDescriptor, ModeSelection, SurfaceDescriptor, Vga8x8,
        WindowSystem,
    };
    use tiny_display::memory::{self, BootInfoFrameAllocator, X86PageMapper};
    use tiny_display::task::Executor;
    use tiny_display::vga_buffer::{TextModeBuffer, VGA_BUFFER_ADDR, VGA_HEIGHT, VGA_WIDTH};
    use tiny_display::{println, serial_println, ErrorContext};
    use x86_64::structures::paging::Translate;
    use x86_64::VirtAddr;

    pub static BOOTLOADER_CONFIG: BootloaderConfig = {
        let mut config = BootloaderConfig::new_default();
        config.mappings.framebuffer = Mapping::Dynamic;
        config.mappings.physical_memory = Some(Mapping::Dynamic);
        config
    };

    entry_point!(kernel_main, config = &BOOTLOADER_CONFIG);

    static mut HEAP: [u8; HEAP_SIZE] = [0; HEAP_SIZE];
    static STOP_REFRESH: AtomicBool = AtomicBool::new(false);

    /// Long mode cannot issue `int 0x10`; the request is only logged.
    struct LongModeBios;

    impl LegacyBios for LongModeBios {
        fn set_text_mode(&mut self, mode: u8) {
            log::warn!("BIOS mode switch to {:#04x} unavailable in long mode", mode);
        }
    }

    struct DesktopNotifier;

    impl WindowSystem for DesktopNotifier {
        fn graphics_ready(&mut self, surface: &SurfaceDescriptor) {
            log::info!("desktop ready on {}x{}", surface.xres, surface.yres);
        }
    }

    const BACKGROUND: u32 = 0x2D_5F8B;
    const TASKBAR: u32 = 0xC0_C0C0;
    const TASKBAR_HEIGHT: i32 = 28;
    const WINDOW: u32 = 0xFF_FFFF;
    const MARKER: u32 = 0xE0_4040;

    /// Background, taskbar, one window and a marker that moves each frame
    #[derive(Default)]
    struct Desktop {
        frame: u32,
    }

    impl Compositor for Desktop {
        fn paint_desktop(&mut self, canvas: &mut Canvas<'_>) {
            let surface = *canvas.surface();
            let (width, height) = (surface.xres as i32, surface.yres as i32);
            self.frame = self.frame.wrapping_add(1);

            canvas.clear(BACKGROUND);
            let _ = canvas.draw_rect(0, height - TASKBAR_HEIGHT, width, TASKBAR_HEIGHT, TASKBAR);
            canvas.draw_string(8, height - TASKBAR_HEIGHT + 10, "tiny_display", &Vga8x8);

            let _ = canvas.draw_rect(40, 40, 320, 120, WINDOW);
            canvas.draw_string(52, 52, "Hello from the framebuffer\nMode selector chose graphics", &Vga8x8);

            let span = (width - 16).max(1) as u32;
            let _ = canvas.draw_rect((self.frame % span) as i32, 8, 16, 16, MARKER);
        }
    }

    fn kernel_main(boot_info: &'static mut BootInfo) -> ! {
        if tiny_display::serial::init().is_ok() {
            serial_println!("[KERNEL] serial ready");
        }
        if tiny_display::logging::init().is_err() {
            serial_println!("[WARN] logger already installed");
        }

        // SAFETY: HEAP is referenced only here.
        if let Err(err) = unsafe { tiny_display::init_heap((&raw mut HEAP).cast(), HEAP_SIZE) } {
            panic!("heap init failed: {:?}", err);
        }

        let BootInfo {
            memory_regions,
            framebuffer,
            physical_memory_offset,
            ..
        } = boot_info;
        let Some(phys_offset) = physical_memory_offset.into_option() else {
            panic!("bootloader did not map physical memory");
        };

        // SAFETY: the text window is reachable through the physical memory mapping.
        let text = unsafe { TextModeBuffer::at((phys_offset + VGA_BUFFER_ADDR as u64) as usize) };
        display::init_console(text, VGA_HEIGHT, VGA_WIDTH);
        println!("tiny_display kernel");

        // SAFETY: all of physical memory is mapped at phys_offset; called once.
        let mut page_table = unsafe { memory::init(VirtAddr::new(phys_offset)) };
        // SAFETY: the regions come straight from the bootloader.
        let mut frames = unsafe { BootInfoFrameAllocator::init(memory_regions) };

        let mode = match framebuffer.as_mut() {
            Some(fb) => {
                let info = fb.info();
                let virt = VirtAddr::new(fb.buffer().as_ptr() as u64);
                match page_table.translate_addr(virt) {
                    Some(phys) => ModeDescriptor::from_boot_framebuffer(&info, phys.as_u64()),
                    None => ModeDescriptor::vga_text(),
                }
            }
            None => ModeDescriptor::vga_text(),
        };

        let mut mapper = X86PageMapper::new(&mut page_table, &mut frames);
        // SAFETY: the mapper edits the active page tables.
        let selection =
            unsafe { display::init_graphics(&mode, &mut mapper, &mut LongModeBios, &mut DesktopNotifier) };

        match selection {
            Ok(ModeSelection::Graphics(surface)) => {
                println!("graphics {}x{}x{}", surface.xres, surface.yres, surface.bits_per_pixel);
                match display::refresh_loop(Desktop::default(), &STOP_REFRESH) {
                    Ok(refresh) => {
                        let executor = Executor::new();
                        executor.spawn(refresh.run());
                        executor.run();
                        log::info!("desktop idle after {} frames", display::frame_generation());
                    }
                    Err(err) => log::error!("refresh loop unavailable: {}", err),
                }
            }
            Ok(ModeSelection::Text(fallback)) => {
                println!("text mode: {}", fallback.reason);
            }
            Err(err) => {
                println!("graphics init failed: {}", err);
                println!("{}", err.context());
            }
        }

        tiny_display::hlt_loop()
    }

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        println!("[KERNEL PANIC] {}", info);
        tiny_display::hlt_loop()
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
