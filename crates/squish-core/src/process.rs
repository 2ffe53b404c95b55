//! Process-backed transform
//!
//! Runs each enabled plugin as a child process that reads the asset on stdin
//! and writes the optimized asset to stdout. Plugins are chained in order.
//!
//! # Plugins
//!
//! - `pngquant` - lossy PNG quantization via the `pngquant` binary
//! - `exec` - any stdin-to-stdout optimizer (`command` + `args`)

use async_trait::async_trait;
use serde_yaml::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::transforms::{BoxError, PluginConfig, Transform, TransformConfig};

/// pngquant exits with this code when the requested quality can't be met
const PNGQUANT_QUALITY_TOO_LOW: i32 = 99;

/// A resolved child-process invocation for one plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    /// Plugin name, for error reporting
    pub plugin: String,
    /// Executable to run
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Exit codes that mean "keep the input as is"
    pub passthrough_codes: Vec<i32>,
}

/// Transform that shells out to optimizer binaries
#[derive(Debug, Clone, Default)]
pub struct ProcessTransform;

impl ProcessTransform {
    /// Create a process transform
    pub fn new() -> Self {
        Self
    }

    /// Check that every plugin is known and its options are well-formed
    pub fn validate(config: &TransformConfig) -> Result<()> {
        for plugin in config.plugins() {
            resolve(plugin)?;
        }
        Ok(())
    }

    async fn run_chain(&self, input: &[u8], config: &TransformConfig) -> Result<Vec<u8>> {
        let mut current = input.to_vec();
        for plugin in config.plugins() {
            let command = resolve(plugin)?;
            current = run_command(&command, current).await?;
        }
        Ok(current)
    }
}

#[async_trait]
impl Transform for ProcessTransform {
    async fn transform(
        &self,
        input: &[u8],
        config: &TransformConfig,
    ) -> std::result::Result<Vec<u8>, BoxError> {
        Ok(self.run_chain(input, config).await?)
    }
}

/// Resolve a plugin into the command that runs it
pub fn resolve(plugin: &PluginConfig) -> Result<PluginCommand> {
    match plugin.name.as_str() {
        "pngquant" => pngquant_command(plugin),
        "exec" => exec_command(plugin),
        other => Err(Error::UnknownPlugin {
            name: other.to_string(),
        }),
    }
}

fn pngquant_command(plugin: &PluginConfig) -> Result<PluginCommand> {
    let options = &plugin.options;
    let invalid = |message: &str| Error::ConfigInvalid {
        message: format!("pngquant: {message}"),
    };

    if !options.is_null() && !options.is_mapping() {
        return Err(invalid("options must be a mapping"));
    }

    let mut args = Vec::new();

    if let Some(speed) = options.get("speed") {
        let speed = speed
            .as_u64()
            .filter(|s| (1..=11).contains(s))
            .ok_or_else(|| invalid("speed must be an integer from 1 to 11"))?;
        args.push("--speed".to_string());
        args.push(speed.to_string());
    }

    if let Some(quality) = options.get("quality") {
        let bounds = quality
            .as_sequence()
            .filter(|q| q.len() == 2)
            .and_then(|q| Some((q[0].as_f64()?, q[1].as_f64()?)))
            .filter(|(min, max)| (0.0..=1.0).contains(min) && (0.0..=1.0).contains(max))
            .filter(|(min, max)| min <= max)
            .ok_or_else(|| invalid("quality must be [min, max] with 0 <= min <= max <= 1"))?;
        args.push(format!(
            "--quality={}-{}",
            (bounds.0 * 100.0).round() as u32,
            (bounds.1 * 100.0).round() as u32
        ));
    }

    match options.get("dithering") {
        None => {}
        Some(Value::Bool(false)) => args.push("--nofs".to_string()),
        Some(level) => {
            let level = level
                .as_f64()
                .filter(|l| (0.0..=1.0).contains(l))
                .ok_or_else(|| invalid("dithering must be false or a number from 0 to 1"))?;
            args.push(format!("--floyd={level}"));
        }
    }

    if let Some(posterize) = options.get("posterize") {
        let bits = posterize
            .as_u64()
            .filter(|b| *b <= 4)
            .ok_or_else(|| invalid("posterize must be an integer from 0 to 4"))?;
        args.push("--posterize".to_string());
        args.push(bits.to_string());
    }

    if flag(options, "strip").map_err(|_| invalid("strip must be a boolean"))? {
        args.push("--strip".to_string());
    }
    if flag(options, "verbose").map_err(|_| invalid("verbose must be a boolean"))? {
        args.push("--verbose".to_string());
    }

    args.push("-".to_string());

    let program = match options.get("binary") {
        None => "pngquant".to_string(),
        Some(binary) => binary
            .as_str()
            .ok_or_else(|| invalid("binary must be a string"))?
            .to_string(),
    };

    Ok(PluginCommand {
        plugin: plugin.name.clone(),
        program,
        args,
        passthrough_codes: vec![PNGQUANT_QUALITY_TOO_LOW],
    })
}

fn exec_command(plugin: &PluginConfig) -> Result<PluginCommand> {
    let invalid = |message: &str| Error::ConfigInvalid {
        message: format!("exec: {message}"),
    };

    let program = plugin
        .options
        .get("command")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| invalid("options.command must be a non-empty string"))?
        .to_string();

    let args = match plugin.options.get("args") {
        None => Vec::new(),
        Some(args) => args
            .as_sequence()
            .ok_or_else(|| invalid("options.args must be a list of strings"))?
            .iter()
            .map(|a| {
                a.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("options.args must be a list of strings"))
            })
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(PluginCommand {
        plugin: plugin.name.clone(),
        program,
        args,
        passthrough_codes: Vec::new(),
    })
}

fn flag(options: &Value, key: &str) -> std::result::Result<bool, ()> {
    match options.get(key) {
        None => Ok(false),
        Some(value) => value.as_bool().ok_or(()),
    }
}

/// Pipe `input` through one plugin process
pub async fn run_command(command: &PluginCommand, input: Vec<u8>) -> Result<Vec<u8>> {
    tracing::trace!(plugin = %command.plugin, program = %command.program, "spawning plugin");

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::PluginFailed {
            plugin: command.plugin.clone(),
            message: format!("failed to run '{}': {}", command.program, e),
            stderr: None,
        })?;

    let mut stdin = child.stdin.take().ok_or_else(|| Error::PluginFailed {
        plugin: command.plugin.clone(),
        message: "stdin was not captured".to_string(),
        stderr: None,
    })?;

    let feed = async {
        let result = stdin.write_all(&input).await;
        drop(stdin);
        match result {
            // the process may legitimately stop reading early
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;

    let code = output.status.code();
    if code.is_some_and(|c| command.passthrough_codes.contains(&c)) {
        tracing::debug!(plugin = %command.plugin, ?code, "plugin declined, keeping input");
        return Ok(input);
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::PluginFailed {
            plugin: command.plugin.clone(),
            message: format!("'{}' exited with {}", command.program, output.status),
            stderr: (!stderr.is_empty()).then_some(stderr),
        });
    }
    fed?;

    Ok(output.stdout)
}
