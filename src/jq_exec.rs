use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, Filter, Native, RcIter};
use jaq_json::Val;

/// A jq program compiled once and run against many documents.
pub struct JqFilter {
    filter: Filter<Native<Val>>,
}

impl JqFilter {
    pub fn compile(filter_src: &str) -> Result<Self> {
        let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let arena = load::Arena::default();
        let program = load::File { code: filter_src, path: () };

        let modules = loader
            .load(&arena, program)
            .map_err(format_parse_errors)?;

        let filter = Compiler::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(format_undefined_errors)?;

        Ok(JqFilter { filter })
    }

    /// Run over one JSON document; every output becomes its own JSON text.
    pub fn run(&self, document: &str) -> Result<Vec<String>> {
        let input: serde_json::Value = serde_json::from_str(document).context("jq input is not JSON")?;
        let inputs = RcIter::new(core::iter::empty());
        let mut it = self.filter.run((Ctx::new([], &inputs), Val::from(input)));

        let mut out = Vec::new();
        while let Some(item) = it.next() {
            let v = item.map_err(|e| anyhow!(format!("{e:?}")))?;
            out.push(format!("{v}"));
        }
        Ok(out)
    }
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow::anyhow!(s)
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    anyhow::anyhow!(s)
}
