//! The provision run: load, bind, then apply Standard, Optional and Disabled
//! declarations in that order.
//!
//! Standard declarations run unprompted. The interactive-mode question is
//! asked once, after the Standard tier and before the Optional tier.
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::cli::{Cli, VERSION};
use crate::config::{Bindings, Declaration, Statement, TRUE_LITERAL, Tier, loader};
use crate::error::ProvisionError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{ExitNotice, Log};
use crate::platform::Platform;
use crate::prompt::{Prompter, StdinPrompter};
use crate::tasks::directive::RawDirective;
use crate::tasks::{Context, HandlerKind, RunSettings, gate, run_handler};

/// Final line logged on every exit path.
pub const FINISHED: &str = "hostprep finished";

/// Injectable services used by a run.
pub struct Services {
    /// Logging backend.
    pub log: Arc<dyn Log>,
    /// Process executor.
    pub executor: Arc<dyn Executor>,
    /// Operator prompts.
    pub prompter: Arc<dyn Prompter>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl Services {
    /// Real processes and stdin prompts, logging to `log`.
    #[must_use]
    pub fn system(log: Arc<dyn Log>) -> Self {
        Self {
            log,
            executor: Arc::new(SystemExecutor),
            prompter: Arc::new(StdinPrompter),
        }
    }
}

/// Run the command and map the outcome to a process exit code.
///
/// Fatal errors are logged at ERROR. The summary and the final
/// [`FINISHED`] line are emitted on every path.
#[must_use]
pub fn execute(args: &Cli, platform: Platform, services: &Services) -> u8 {
    let _notice = ExitNotice::new(Arc::clone(&services.log), FINISHED);
    let code = match run(args, platform, services) {
        Ok(()) => 0,
        Err(e) => {
            services.log.error(&e.to_string());
            1
        }
    };
    services.log.print_summary();
    code
}

/// Apply the configuration named by `args`.
///
/// # Errors
///
/// Returns [`ProvisionError::PrivilegeError`] before reading anything when
/// not running as root, [`ProvisionError::ConfigNotFound`] when the file is
/// unreadable, and the first Standard-tier [`ProvisionError::ActionFailed`].
/// Optional-tier failures are logged and never returned.
pub fn run(args: &Cli, platform: Platform, services: &Services) -> Result<(), ProvisionError> {
    let log = &services.log;
    if !platform.privileged {
        return Err(ProvisionError::PrivilegeError);
    }
    log.info(&format!(
        "hostprep {VERSION} on {} ({})",
        platform.distro, platform.arch
    ));

    let config = loader::load(&args.config)?;
    log.info(&format!(
        "loaded {} declarations from {} ({} standard, {} optional, {} disabled)",
        config.len(),
        args.config.display(),
        config.standard.len(),
        config.optional.len(),
        config.disabled.len()
    ));
    let bindings = Bindings::from_config(&config);
    log.debug(&format!("{} variables bound", bindings.len()));

    if args.dry_run {
        log.info("dry run: nothing will be changed");
    }

    // Standard declarations always run without per-step confirmation.
    let standard = Context {
        settings: RunSettings {
            interactive: false,
            verbose: args.verbose,
            dry_run: args.dry_run,
            root: args.root.clone(),
        },
        bindings,
        platform,
        log: Arc::clone(log),
        executor: Arc::clone(&services.executor),
        prompter: Arc::clone(&services.prompter),
    };
    let mut ran = HashSet::new();
    for decl in &config.standard {
        run_standard(&standard, decl, &mut ran)?;
    }

    let interactive = if args.yes {
        log.debug("--yes given; applying every step without prompting");
        false
    } else {
        gate::resolve_interactive(services.prompter.as_ref(), log.as_ref())
    };
    let optional = Context {
        settings: RunSettings {
            interactive,
            ..standard.settings
        },
        ..standard
    };
    for decl in &config.optional {
        run_optional(&optional, decl, &mut ran);
    }
    for decl in &config.disabled {
        log.info(&format!(
            "{} (line {}): {} not executed",
            Tier::Disabled,
            decl.line,
            decl.text
        ));
    }
    Ok(())
}

/// Run a handler unless it already ran earlier in this run.
fn dispatch(
    ctx: &Context,
    kind: HandlerKind,
    tier: Tier,
    ran: &mut HashSet<HandlerKind>,
) -> Result<(), ProvisionError> {
    if !ran.insert(kind) {
        ctx.log
            .debug(&format!("{kind}: {} already ran", kind.handler().name()));
        return Ok(());
    }
    run_handler(ctx, kind.handler(), tier).map(|_| ())
}

/// Bind-or-execute one `STANDARD` declaration. Every error is fatal.
fn run_standard(
    ctx: &Context,
    decl: &Declaration,
    ran: &mut HashSet<HandlerKind>,
) -> Result<(), ProvisionError> {
    match decl.statement() {
        Statement::Directive(command) => {
            run_handler(ctx, &RawDirective::new(&command, decl.line), Tier::Standard)
                .map(|_| ())
        }
        Statement::Assign { key, value } => match HandlerKind::from_flag(&key) {
            Some(kind) if value == TRUE_LITERAL => dispatch(ctx, kind, Tier::Standard, ran),
            _ => {
                ctx.log.debug(&format!("bound {key}"));
                Ok(())
            }
        },
    }
}

/// Evaluate one `OPTIONAL` declaration against the dispatch table.
/// Failures are logged and the run continues.
fn run_optional(ctx: &Context, decl: &Declaration, ran: &mut HashSet<HandlerKind>) {
    let (key, value) = match decl.statement() {
        Statement::Assign { key, value } => (key, value),
        Statement::Directive(text) => {
            ctx.log.debug(&format!(
                "line {}: optional directive ignored: {text}",
                decl.line
            ));
            return;
        }
    };
    let Some(kind) = HandlerKind::from_flag(&key) else {
        ctx.log
            .debug(&format!("line {}: no handler for {key}", decl.line));
        return;
    };
    if value != TRUE_LITERAL {
        ctx.log.debug(&format!(
            "line {}: {key} is not {TRUE_LITERAL}; {} skipped",
            decl.line,
            kind.handler().name()
        ));
        return;
    }
    if let Err(e) = dispatch(ctx, kind, Tier::Optional, ran) {
        ctx.log.error(&e.to_string());
    }
}
