#[cfg(not(feature = "mobj-format"))]
fn main() {
    eprintln!(
        "The bdnav CLI requires the \"mobj-format\" feature. Rebuild with `--features mobj-format` to enable it."
    );
}

#[cfg(feature = "mobj-format")]
mod cli {
    use std::env;

    use anyhow::Context;
    use bdnav::mobj::{self, MobjCommand, MovieObject, MovieObjectFile};

    fn object_json(obj: &MovieObject) -> serde_json::Value {
        serde_json::json!({
            "resume_intention": obj.resume_intention(),
            "menu_call_mask": obj.menu_call_mask(),
            "title_search_mask": obj.title_search_mask(),
            "commands": obj.cmds,
        })
    }

    fn file_json(file: &MovieObjectFile) -> serde_json::Value {
        serde_json::json!({
            "version": file.version,
            "extension_data_start": file.extension_data_start,
            "objects": file.objects.iter().map(object_json).collect::<Vec<_>>(),
        })
    }

    fn print_command(i: usize, cmd: &MobjCommand) {
        println!(
            "    {:5}: grp {} sub {} opcnt {}{}{} branch {:#x} cmp {:#x} set {:#x}  dst {:#010x} src {:#010x}",
            i,
            cmd.insn.grp,
            cmd.insn.sub_grp,
            cmd.insn.op_cnt,
            if cmd.insn.imm_op1 { " imm1" } else { "" },
            if cmd.insn.imm_op2 { " imm2" } else { "" },
            cmd.insn.branch_opt,
            cmd.insn.cmp_opt,
            cmd.insn.set_opt,
            cmd.dst,
            cmd.src,
        );
    }

    fn print_object(i: usize, obj: &MovieObject) {
        println!(
            "  object {}: resume={} menu_call_mask={} title_search_mask={} ({} commands)",
            i,
            obj.resume_intention(),
            obj.menu_call_mask(),
            obj.title_search_mask(),
            obj.cmds.len()
        );
        for (j, cmd) in obj.cmds.iter().enumerate() {
            print_command(j, cmd);
        }
    }

    pub fn run() -> anyhow::Result<()> {
        let mut file_arg: Option<String> = None;
        let mut json_output = false;
        let mut object_filter: Option<usize> = None;
        let mut show_help = false;

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => {
                    json_output = true;
                }
                "--help" | "-h" => {
                    show_help = true;
                }
                "--object" => match args.next().and_then(|v| v.parse().ok()) {
                    Some(n) => object_filter = Some(n),
                    None => {
                        eprintln!("--object requires a numeric argument");
                        show_help = true;
                    }
                },
                _ if arg.starts_with('-') => {
                    eprintln!("Unknown flag: {}", arg);
                    show_help = true;
                }
                _ => {
                    file_arg = Some(arg);
                }
            }
        }

        if show_help || file_arg.is_none() {
            eprintln!(
                "Usage:\n  bdnav [--json] [--object N] <MovieObject.bdmv>\n\nFlags:\n  --json        Dump the parsed container as JSON\n  --object N    Show only object N\n  -h, --help    Show this help\n"
            );
            return Ok(());
        }

        let path = file_arg.unwrap();
        let file = mobj::parse(&path).with_context(|| format!("parsing {}", path))?;

        if json_output {
            println!("{}", serde_json::to_string_pretty(&file_json(&file))?);
            return Ok(());
        }

        println!(
            "{}: version {:?}, {} objects, extension data at {:#x}",
            path,
            file.version,
            file.objects.len(),
            file.extension_data_start
        );
        match object_filter {
            Some(n) => match file.objects.get(n) {
                Some(obj) => print_object(n, obj),
                None => anyhow::bail!("object {} out of range (file has {})", n, file.objects.len()),
            },
            None => {
                for (i, obj) in file.objects.iter().enumerate() {
                    print_object(i, obj);
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "mobj-format")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
