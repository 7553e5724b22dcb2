use std::io::Write;

use anyhow::Context;
use pt_core::installer::{Acquisition, Installer};
use pt_core::query::{Repository, RequestType};
use pt_core::query_manager::browser::browse;
use pt_core::query_manager::resolver::resolve;
use pt_core::{printerror, printinfo, printwarn, AcquisitionError, DisplayOptions, Prompter, QueryError, ResultRecord};

pub struct SearchCommand<'r> {
    repo: &'r dyn Repository,
    opts: DisplayOptions,
    request_type: RequestType,
    installer: Installer<'r>,
}

impl<'r> SearchCommand<'r> {
    pub fn new(repo: &'r dyn Repository, opts: DisplayOptions) -> SearchCommand<'r> {
        return SearchCommand {
            repo,
            opts,
            request_type: RequestType::Search,
            installer: Installer::new(repo),
        };
    }
    pub fn set_request_type(&mut self, request_type: RequestType) {
        self.request_type = request_type;
    }
    #[cfg(test)]
    pub fn set_installer(&mut self, installer: Installer<'r>) {
        self.installer = installer;
    }

    pub fn execute(&self, pkg_name: &str, out: &mut dyn Write, prompter: &mut dyn Prompter) -> anyhow::Result<()> {
        /*!
         * search -> resolve -> exact match | alternatives
         * Search errors are fatal. A malformed record ends the command but not with a failure.
         */
        let outcome = self.repo.search(pkg_name, self.request_type)
            .with_context(|| format!("Could not search the AUR for '{pkg_name}'"))?;

        // resultcount is informational, an empty results array is what counts.
        if outcome.records.is_empty() {
            printinfo!("No results found.");
            return Ok(());
        }

        let resolved = match resolve(pkg_name, outcome.records) {
            Ok(resolved) => resolved,
            Err(QueryError::DataFormat(msg)) => {
                printerror!("Could not rank the results: {msg}");
                return Ok(());
            },
            Err(err) => return Err(err.into()),
        };

        if let Some(exact) = resolved.exact_match {
            return self.direct_match(&exact, out, prompter);
        }

        printinfo!("Could not find a direct match. Found {} alternatives:", resolved.alternatives.len());
        browse(
            &resolved.alternatives,
            self.opts.page_size.get(),
            self.opts.show_all,
            self.opts.display_mode(),
            out,
            prompter,
        )?;
        return Ok(());
    }

    fn direct_match(&self, pkg: &ResultRecord, out: &mut dyn Write, prompter: &mut dyn Prompter) -> anyhow::Result<()> {
        printinfo!("Found a direct match:");
        pkg.print_entry(out, self.opts.display_mode())?;
        out.flush()?;

        let mode = match self.opts.acquire_mode() {
            Some(mode) => mode,
            None => return Ok(()),
        };

        return match self.installer.acquire(pkg, mode, &self.opts.output_dir, prompter, out) {
            Ok(Acquisition::Declined) => Ok(()),
            Ok(Acquisition::Downloaded(path)) => {
                println_to(out, &format!("Saved {} as {}", pkg.name(), path.display()))?;
                Ok(())
            },
            Ok(Acquisition::Installed(_)) => {
                println_to(out, &format!("Installed {}", pkg.name()))?;
                Ok(())
            },
            Err(err) if err.is_warning() => {
                printwarn!("{err}");
                Ok(())
            },
            Err(err @ AcquisitionError::DataFormat(_)) => {
                printerror!("{err}");
                Ok(())
            },
            Err(err) => Err(err).with_context(|| format!("Could not acquire '{}'", pkg.name())),
        };
    }
}

fn println_to(out: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(out, "{msg}")?;
    return out.flush();
}
