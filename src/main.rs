use std::env;
use std::fs;
use std::process;

use htvm::{decode_unit, Vm};

fn run(path: &str) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| format!("Error reading file '{}': {}", path, e))?;
    let unit = decode_unit(&bytes).map_err(|e| e.to_string())?;

    let mut vm = Vm::new();
    vm.set_constants(unit.constants);
    let result = vm.execute(unit.instructions);
    print!("{}", vm.get_output());
    result
        .map(|_| ())
        .map_err(|e| format!("Runtime error: {}", e))
}

fn disassemble(path: &str) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| format!("Error reading file '{}': {}", path, e))?;
    let unit = decode_unit(&bytes).map_err(|e| e.to_string())?;

    println!("; constants: {}", unit.constants.len());
    for (index, constant) in unit.constants.iter().enumerate() {
        println!(";   c{} = {:?}", index, constant);
    }
    for (index, instr) in unit.instructions.iter().enumerate() {
        println!("{:04}  {}", index, instr);
    }
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("HTVM: hypertext virtual machine v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} <file.htb>           Run a bytecode unit", program);
    eprintln!("  {} -d <file.htb>        Disassemble a bytecode unit", program);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "-d" => {
            if args.len() < 3 {
                eprintln!("Error: -d requires a file argument");
                process::exit(1);
            }
            disassemble(&args[2])
        }
        "-h" | "--help" => {
            print_usage(&args[0]);
            Ok(())
        }
        filename => run(filename),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
