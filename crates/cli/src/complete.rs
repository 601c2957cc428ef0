//! Shell auto-completion
//!
//! Shell completion scripts call the plugin with `--generate-auto-complete`
//! appended to the words typed so far. The plugin answers with one candidate
//! per line: the subcommands available at that point, then the flags that
//! have not been used yet.

use clap::Command;

/// Hidden flag that switches a plugin into completion mode
pub const COMPLETION_FLAG: &str = "generate-auto-complete";

/// Whether `args` ask for completion candidates
///
/// Words after `--` belong to another program and are not inspected.
pub fn requested<S: AsRef<str>>(args: &[S]) -> bool {
    let flag = format!("--{}", COMPLETION_FLAG);
    args.iter()
        .map(AsRef::as_ref)
        .take_while(|a| *a != "--")
        .any(|a| a == flag)
}

/// Completion candidates for the words in `args` (program name excluded)
///
/// A `help` word is skipped, so `help <command>` completes like `<command>`.
/// Values of flags never select a subcommand.
pub fn candidates<S: AsRef<str>>(cmd: &Command, args: &[S]) -> Vec<String> {
    let mut root = cmd.clone();
    root.build();

    let mut current = &root;
    let mut words = args.iter().map(AsRef::as_ref).take_while(|w| *w != "--");
    while let Some(word) = words.next() {
        if word.starts_with('-') {
            if takes_value(current, word) {
                words.next();
            }
            continue;
        }
        if word == "help" {
            continue;
        }
        if let Some(sub) = current.find_subcommand(word) {
            current = sub;
        }
    }

    let mut out = Vec::new();
    for sub in current.get_subcommands().filter(|s| !s.is_hide_set()) {
        out.push(sub.get_name().to_string());
        out.extend(sub.get_visible_aliases().map(str::to_string));
    }

    let used = |candidate: &str| args.iter().any(|a| a.as_ref() == candidate);
    for arg in current.get_arguments() {
        if arg.is_positional() || arg.is_hide_set() || arg.get_id().as_str() == COMPLETION_FLAG {
            continue;
        }

        let longs = arg
            .get_long()
            .into_iter()
            .chain(arg.get_visible_aliases().unwrap_or_default())
            .map(|long| format!("--{}", long));
        let shorts = arg
            .get_short()
            .into_iter()
            .chain(arg.get_visible_short_aliases().unwrap_or_default())
            .map(|short| format!("-{}", short));

        out.extend(longs.chain(shorts).filter(|c| !used(c)));
    }

    out
}

/// Whether `word` is a flag of `cmd` whose value is the next word
fn takes_value(cmd: &Command, word: &str) -> bool {
    if word.contains('=') {
        return false;
    }

    let arg = if let Some(long) = word.strip_prefix("--") {
        cmd.get_arguments().find(|a| {
            a.get_long() == Some(long)
                || a.get_all_aliases().is_some_and(|aliases| aliases.contains(&long))
        })
    } else {
        let mut shorts = word[1..].chars();
        match (shorts.next(), shorts.next()) {
            (Some(short), None) => cmd.get_arguments().find(|a| a.get_short() == Some(short)),
            _ => None,
        }
    };

    arg.is_some_and(|a| a.get_action().takes_values())
}
