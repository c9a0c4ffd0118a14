//! Interactive shell: tokenizer and dispatch table over [`vfs_core::Vfs`].
//!
//! Grounded on the original `vfs` tool's `parse`/`exec_com` pair: one line
//! in, split on whitespace into a command and its positional arguments, one
//! operation dispatched to completion before the next line is read. Every
//! mutating command here either commits fully or reports a diagnostic and
//! leaves the image untouched; there is no bubbling failure out of the
//! prompt loop.

use std::io::{self, BufRead, Write};
use std::path::Path;

use vfs_core::Vfs;
use vfs_err::Error;

const PROMPT: &str = "vfs$ ";

/// Runs the prompt loop to completion: EOF on stdin or an `exit` command.
pub fn run(vfs: &mut Vfs) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if let Control::Exit = dispatch(vfs, &tokens) {
            return Ok(());
        }
    }
}

enum Control {
    Continue,
    Exit,
}

fn dispatch(vfs: &mut Vfs, tokens: &[&str]) -> Control {
    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "exit" => return Control::Exit,
        "ls" => {
            if arity(cmd, args, 0, 0) {
                for line in vfs.ls() {
                    println!("{line}");
                }
            }
        }
        "pwd" => {
            if arity(cmd, args, 0, 0) {
                println!("{}", vfs.pwd());
            }
        }
        "mkdir" => {
            if arity(cmd, args, 1, 1) {
                report(cmd, vfs.mkdir(args[0]));
            }
        }
        "cd" => {
            if arity(cmd, args, 1, 1) {
                report(cmd, vfs.cd(args[0]));
            }
        }
        "rmdir" => {
            if arity(cmd, args, 1, 1) {
                report(cmd, vfs.rmdir(args[0]));
            }
        }
        "get" => {
            if arity(cmd, args, 2, 2) {
                report(cmd, vfs.get(Path::new(args[0]), args[1]));
            }
        }
        "put" => {
            if arity(cmd, args, 2, 2) {
                report(cmd, vfs.put(args[0], Path::new(args[1])));
            }
        }
        "cat" => {
            if arity(cmd, args, 1, 1) {
                let mut stdout = io::stdout();
                report(cmd, vfs.cat(args[0], &mut stdout));
            }
        }
        "cp" => {
            if arity(cmd, args, 2, 2) {
                report(cmd, vfs.cp(args[0], args[1]));
            }
        }
        "mv" => {
            if arity(cmd, args, 2, 2) {
                report(cmd, vfs.mv(args[0], args[1]));
            }
        }
        "rm" => {
            if arity(cmd, args, 1, 1) {
                report(cmd, vfs.rm(args[0]));
            }
        }
        _ => println!("ERROR(input: command not found)"),
    }
    Control::Continue
}

/// Checks `args.len()` against `[min, max]`, printing the shell-style arity
/// diagnostic and returning `false` if it doesn't fit.
fn arity(cmd: &str, args: &[&str], min: usize, max: usize) -> bool {
    if args.len() < min {
        println!("{cmd}: missing operand");
        false
    } else if args.len() > max {
        println!("{cmd}: too many operands");
        false
    } else {
        true
    }
}

fn report(cmd: &str, result: vfs_err::Result<()>) {
    if let Err(err) = result {
        match err {
            Error::DiskFull => println!("Disk full."),
            Error::Io(io_err) => println!("{cmd}: {io_err}"),
            other => println!("{cmd}: {other}"),
        }
    }
}
