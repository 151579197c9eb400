pub mod deps;
pub mod info;
pub mod install;
pub mod rebase;
pub mod root;
pub mod run;
pub mod version;

use miette::Result;
use nodepack_core::{Config, Error};
use serde_json::{json, Value};

/// Shared state for every command.
pub struct Context {
    pub config: Config,
    pub json: bool,
}

/// Report a successful command.
///
/// In JSON mode `fields` is printed as one object with `"ok": true` added;
/// otherwise `human` prints the result.
pub fn succeed(ctx: &Context, fields: Value, human: impl FnOnce()) -> Result<()> {
    if ctx.json {
        let mut out = json!({ "ok": true });
        if let (Some(out), Value::Object(fields)) = (out.as_object_mut(), fields) {
            out.extend(fields);
        }
        println!("{out}");
    } else {
        human();
    }
    Ok(())
}

/// Report a failed command.
///
/// In JSON mode the error is printed as `{"ok": false, "error": {...}}` and
/// the process exits with status 1; otherwise it is returned for miette to
/// render.
pub fn fail(err: &Error, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            json!({
                "ok": false,
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                }
            })
        );
        std::process::exit(1);
    }
    Err(miette::miette!(code = err.code(), "{err}"))
}

