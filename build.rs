fn main() {
    // the firmware binary only links for the chip; the host never builds it
    if std::env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("xtensa") {
        linker_be_nice();
        // linkall.x must be the last linker script
        println!("cargo:rustc-link-arg=-Tlinkall.x");
    }
    println!("cargo:rerun-if-changed=config/buzzwire.txt");
}

fn linker_be_nice() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        let kind = &args[1];
        let what = &args[2];

        match kind.as_str() {
            "undefined-symbol" => {
                if what == "_stack_start" {
                    eprintln!();
                    eprintln!("Is the linker script `linkall.x` missing?");
                    eprintln!();
                }
            }
            _ => std::process::exit(1),
        }

        std::process::exit(0);
    }

    if let Ok(exe) = std::env::current_exe() {
        println!(
            "cargo:rustc-link-arg=-Wl,--error-handling-script={}",
            exe.display()
        );
    }
}
