//! The recursive per-path interpreter over the rule tree, and the top-level
//! `validate` entry point. See spec §4.5 and §5.

use std::path::Path;

use rayon::prelude::*;

use crate::adapters::StorageAdapter;
use crate::context::{DsValidationError, ErrMessage, EvalCtx, LocationErrors, ValidationReport};
use crate::convention::MetaConvention;
use crate::error::DsError;
use crate::json::handler::HandlerInput;
use crate::json::validate::{resolve_validator, validate_metadata};
use crate::rule::{DSRule, Rule, TypeEnum, ValidatorRef};
use crate::slice::{expand_description, PathSlice};

/// Options that stay fixed for an entire validation run.
pub struct ValidateOptions<'a> {
    pub convention: &'a MetaConvention,
    pub local_basedir: Option<&'a Path>,
    pub relative_prefix: &'a str,
}

/// Ask `adapter` for its paths, skip metadata companions, and evaluate
/// `root` against every remaining path. Runs in parallel when the adapter
/// declares itself thread-safe (spec §5).
pub fn validate(
    adapter: &dyn StorageAdapter,
    root: &DSRule,
    opts: &ValidateOptions<'_>,
) -> Result<ValidationReport, DsError> {
    let paths = adapter.get_paths()?;
    let targets: Vec<&String> = paths.iter().filter(|p| !opts.convention.is_meta(p)).collect();
    log::debug!("validating {} path(s) (of {} enumerated)", targets.len(), paths.len());

    let eval_one = |path: &&String| -> Result<(String, LocationErrors), DsError> {
        log::trace!("evaluating rule tree against '{path}'");
        let ctx = EvalCtx::fresh();
        let (_ok, errs) = validate_path(path, root, ctx, adapter, opts.convention, opts.local_basedir, opts.relative_prefix)?;
        Ok(((*path).clone(), errs))
    };

    let results: Vec<Result<(String, LocationErrors), DsError>> = if adapter.is_thread_safe() {
        log::debug!("adapter is thread-safe; evaluating paths in parallel");
        targets.par_iter().map(eval_one).collect()
    } else {
        targets.iter().map(eval_one).collect()
    };

    let mut report = ValidationReport::new();
    for r in results {
        let (path, errs) = r?;
        if !errs.is_empty() {
            log::warn!("'{path}' failed validation with {} error(s)", errs.len());
            report.insert(path, errs);
        }
    }
    log::debug!("validation run complete: {} path(s) failed", report.len());
    Ok(report)
}

fn type_fail_message(te: TypeEnum) -> String {
    match te {
        TypeEnum::Missing => "Entity exists, but should not exist".to_string(),
        TypeEnum::File => "Entity does not have expected type: 'file'".to_string(),
        TypeEnum::Dir => "Entity does not have expected type: 'dir'".to_string(),
        TypeEnum::Any => "Entity does not exist, but should exist".to_string(),
    }
}

/// Either the rule's custom `description` (with backreferences expanded
/// against `psl`'s last-attempted match), or `fallback`.
fn describe(
    psl: &PathSlice,
    pat: Option<&regex::Regex>,
    rule: &Rule,
    fallback: String,
) -> Result<String, DsError> {
    match &rule.description {
        Some(template) => expand_description(psl, pat, template),
        None => Ok(fallback),
    }
}

fn msg_error(ctx: &EvalCtx, path: &str, msg: String) -> LocationErrors {
    let mut errs = LocationErrors::new();
    errs.insert(
        ctx.location_str(),
        DsValidationError {
            path: path.to_string(),
            err: ErrMessage::Msg(msg),
        },
    );
    errs
}

/// Run a `valid`/`validMeta` reference against `target_path` (the entity
/// path itself for `valid`, its metadata companion for `validMeta`).
/// `original_exists` always refers to the entity path, even for `validMeta`.
#[allow(clippy::too_many_arguments)]
fn run_valid(
    vref: &ValidatorRef,
    original_exists: bool,
    target_path: &str,
    adapter: &dyn StorageAdapter,
    local_basedir: Option<&Path>,
    relative_prefix: &str,
    ctx: &EvalCtx,
) -> Result<(bool, LocationErrors), DsError> {
    if !original_exists {
        return Ok((false, msg_error(ctx, target_path, "path does not exist".to_string())));
    }

    let resolved = resolve_validator(vref, local_basedir, relative_prefix)?;

    let raw = match adapter.open_file(target_path) {
        Some(b) => b,
        None => return Ok((false, msg_error(ctx, target_path, "could not load".to_string()))),
    };

    let result_errs = if resolved.wants_json() {
        match adapter.decode_json(&raw, target_path) {
            Some(value) => validate_metadata(HandlerInput::Json(&value), &resolved)?,
            None => return Ok((false, msg_error(ctx, target_path, "could not parse".to_string()))),
        }
    } else {
        validate_metadata(HandlerInput::Raw(&raw), &resolved)?
    };

    if result_errs.is_empty() {
        Ok((true, LocationErrors::new()))
    } else {
        let mut errs = LocationErrors::new();
        errs.insert(
            ctx.location_str(),
            DsValidationError {
                path: target_path.to_string(),
                err: ErrMessage::Json(result_errs),
            },
        );
        Ok((false, errs))
    }
}

/// Evaluate `rule` against `path`. Returns whether it succeeded and the
/// errors recorded at or below this node (for the caller to merge, subject
/// to its own `details` flag).
#[allow(clippy::too_many_arguments)]
pub fn validate_path(
    path: &str,
    rule: &DSRule,
    ctx: EvalCtx,
    adapter: &dyn StorageAdapter,
    conv: &MetaConvention,
    local_basedir: Option<&Path>,
    relative_prefix: &str,
) -> Result<(bool, LocationErrors), DsError> {
    let r = match rule {
        DSRule::Bool(true) => return Ok((true, LocationErrors::new())),
        DSRule::Bool(false) => {
            return Ok((
                false,
                msg_error(&ctx, path, "reached unsatisfiable false".to_string()),
            ))
        }
        DSRule::Node(r) => r.as_ref(),
    };

    // The rule's own match/matchStart/matchStop override the inherited
    // context for this node and everything below it (spec §3, §9).
    let mut ctx = ctx;
    if let Some(ms) = r.match_start {
        ctx.match_start = Some(ms);
    }
    if let Some(me) = r.match_stop {
        ctx.match_stop = Some(me);
    }
    if let Some(mp) = &r.match_ {
        ctx.match_pat = Some(mp.0.clone());
    }
    let match_pat = ctx.match_pat.clone();

    let mut errs = LocationErrors::new();

    // Stage 1 — match/rewrite.
    let psl = PathSlice::into(path, ctx.match_start, ctx.match_stop);
    let mut next_path = path.to_string();

    if r.match_.is_some() || r.rewrite.is_some() {
        match psl.rewrite(match_pat.as_ref(), r.rewrite.as_deref())? {
            Some(rewritten) => next_path = rewritten.unslice(),
            None => {
                let fallback = "path slice does not match the required pattern".to_string();
                let msg = describe(&psl, match_pat.as_ref(), r, fallback)?;
                errs.extend(msg_error(&ctx, path, msg));
                return Ok((false, errs));
            }
        }
    }

    // Stage 2 — primitive constraints.
    let is_file = adapter.is_file(path);
    let is_dir = adapter.is_dir(path);
    let exists = is_file || is_dir;
    let mut stage2_ok = true;

    if let Some(te) = r.type_ {
        if !te.is_satisfied(is_file, is_dir) {
            stage2_ok = false;
            let fallback = type_fail_message(te);
            let msg = describe(&psl, match_pat.as_ref(), r, fallback)?;
            errs.extend(msg_error(&ctx.descend("type"), path, msg));
        }
    }

    if let Some(vref) = &r.valid {
        let (ok, sub_errs) = run_valid(
            vref,
            exists,
            path,
            adapter,
            local_basedir,
            relative_prefix,
            &ctx.descend("valid"),
        )?;
        stage2_ok &= ok;
        errs.extend(sub_errs);
    }

    if let Some(vref) = &r.valid_meta {
        let meta_path = conv.meta_for(path, is_dir);
        let (ok, sub_errs) = run_valid(
            vref,
            exists,
            &meta_path,
            adapter,
            local_basedir,
            relative_prefix,
            &ctx.descend("validMeta"),
        )?;
        stage2_ok &= ok;
        errs.extend(sub_errs);
    }

    if !stage2_ok {
        return Ok((false, errs));
    }

    // Stage 3 — logical combinators, in if/then/else, allOf, oneOf, anyOf, not
    // order. Every combinator present on this node runs regardless of whether
    // an earlier one in the same stage already failed, so the error report
    // reflects all of them; only the aggregate `stage3_ok` is checked once,
    // below, before stage 4.
    let mut stage3_ok = true;

    if let Some(if_rule) = &r.if_ {
        let (if_ok, _) = validate_path(
            path,
            if_rule,
            ctx.descend("if"),
            adapter,
            conv,
            local_basedir,
            relative_prefix,
        )?;
        let branch = if if_ok { r.then.as_deref() } else { r.else_.as_deref() };
        let step = if if_ok { "then" } else { "else" };
        if let Some(branch_rule) = branch {
            let (b_ok, b_errs) = validate_path(
                path,
                branch_rule,
                ctx.descend(step),
                adapter,
                conv,
                local_basedir,
                relative_prefix,
            )?;
            if !b_ok {
                stage3_ok = false;
                if r.details {
                    errs.extend(b_errs);
                }
            }
        }
    }

    if !r.all_of.is_empty() {
        let mut satisfied = 0usize;
        let mut sub_errs = LocationErrors::new();
        for (i, sub) in r.all_of.iter().enumerate() {
            let (ok, e) = validate_path(
                path,
                sub,
                ctx.descend(format!("allOf/{i}")),
                adapter,
                conv,
                local_basedir,
                relative_prefix,
            )?;
            if ok {
                satisfied += 1;
            } else {
                sub_errs.extend(e);
            }
        }
        if satisfied != r.all_of.len() {
            stage3_ok = false;
            let fallback = format!(
                "All {} sub-rules must be satisfied (satisfied: {satisfied})",
                r.all_of.len()
            );
            let msg = describe(&psl, match_pat.as_ref(), r, fallback)?;
            errs.extend(msg_error(&ctx.descend("allOf"), path, msg));
            if r.details {
                errs.extend(sub_errs);
            }
        }
    }

    if !r.one_of.is_empty() {
        let mut satisfied = 0usize;
        let mut sub_errs = LocationErrors::new();
        for (i, sub) in r.one_of.iter().enumerate() {
            let (ok, e) = validate_path(
                path,
                sub,
                ctx.descend(format!("oneOf/{i}")),
                adapter,
                conv,
                local_basedir,
                relative_prefix,
            )?;
            if ok {
                satisfied += 1;
            } else {
                sub_errs.extend(e);
            }
        }
        if satisfied != 1 {
            stage3_ok = false;
            let fallback = format!("Exactly one sub-rule must be satisfied (satisfied: {satisfied})");
            let msg = describe(&psl, match_pat.as_ref(), r, fallback)?;
            errs.extend(msg_error(&ctx.descend("oneOf"), path, msg));
            if r.details {
                errs.extend(sub_errs);
            }
        }
    }

    if !r.any_of.is_empty() {
        let mut satisfied = false;
        let mut sub_errs = LocationErrors::new();
        for (i, sub) in r.any_of.iter().enumerate() {
            let (ok, e) = validate_path(
                path,
                sub,
                ctx.descend(format!("anyOf/{i}")),
                adapter,
                conv,
                local_basedir,
                relative_prefix,
            )?;
            if ok {
                satisfied = true;
                sub_errs.clear();
                break;
            } else {
                sub_errs.extend(e);
            }
        }
        if !satisfied {
            stage3_ok = false;
            let fallback = format!("None of the {} sub-rules is satisfied", r.any_of.len());
            let msg = describe(&psl, match_pat.as_ref(), r, fallback)?;
            errs.extend(msg_error(&ctx.descend("anyOf"), path, msg));
            if r.details {
                errs.extend(sub_errs);
            }
        }
    }

    if let Some(not_rule) = &r.not_ {
        let (not_ok, _) = validate_path(
            path,
            not_rule,
            ctx.descend("not"),
            adapter,
            conv,
            local_basedir,
            relative_prefix,
        )?;
        if not_ok {
            stage3_ok = false;
            let fallback = "negated sub-rule satisfied, but should have failed".to_string();
            let msg = describe(&psl, match_pat.as_ref(), r, fallback)?;
            errs.extend(msg_error(&ctx.descend("not"), path, msg));
        }
    }

    if !stage3_ok {
        return Ok((false, errs));
    }

    // Stage 4 — implication on the (possibly rewritten) path.
    if let Some(next_rule) = &r.next {
        let (ok, sub_errs) = validate_path(
            &next_path,
            next_rule,
            ctx.descend("next"),
            adapter,
            conv,
            local_basedir,
            relative_prefix,
        )?;
        errs.extend(sub_errs);
        if !ok {
            return Ok((false, errs));
        }
    }

    Ok((true, errs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// A purely in-memory adapter for exercising rule logic without disk I/O.
    struct MemDir {
        files: HashSet<&'static str>,
        dirs: HashSet<&'static str>,
    }

    impl StorageAdapter for MemDir {
        fn get_paths(&self) -> Result<Vec<String>, DsError> {
            let mut v: Vec<String> = self
                .files
                .iter()
                .chain(self.dirs.iter())
                .map(|s| s.to_string())
                .collect();
            v.sort();
            Ok(v)
        }
        fn is_dir(&self, path: &str) -> bool {
            path.is_empty() || self.dirs.contains(path)
        }
        fn is_file(&self, path: &str) -> bool {
            self.files.contains(path)
        }
        fn open_file(&self, _path: &str) -> Option<Vec<u8>> {
            None
        }
        fn is_thread_safe(&self) -> bool {
            true
        }
    }

    fn rule_from_json(s: &str) -> DSRule {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn trivial_rule_succeeds_everywhere() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let (ok, errs) = validate_path("", &DSRule::Bool(true), EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(ok);
        assert!(errs.is_empty());
    }

    #[test]
    fn false_rule_fails_with_message() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let (ok, errs) =
            validate_path("foo", &DSRule::Bool(false), EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(!ok);
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn type_mismatch_reports_expected_message() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let rule = rule_from_json(r#"{"anyOf": [{"match": "", "next": {"type": "file"}}]}"#);
        let (ok, errs) = validate_path("", &rule, EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(!ok);
        let err = errs.get("/anyOf/0/next/type").expect("expected error at that location");
        match &err.err {
            ErrMessage::Msg(m) => assert_eq!(m, "Entity does not have expected type: 'file'"),
            ErrMessage::Json(_) => panic!("expected a plain message"),
        }
    }

    #[test]
    fn all_of_empty_is_vacuously_satisfied() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let rule = rule_from_json(r#"{"allOf": []}"#);
        let (ok, errs) = validate_path("", &rule, EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(ok);
        assert!(errs.is_empty());
    }

    #[test]
    fn any_of_discards_errors_from_earlier_failed_branches_on_success() {
        let mut dirs = HashSet::new();
        dirs.insert("foo");
        let adapter = MemDir { files: HashSet::new(), dirs };
        let conv = MetaConvention::default();
        let rule = rule_from_json(r#"{"anyOf": [{"type": "file"}, {"type": "dir"}]}"#);
        let (ok, errs) = validate_path("foo", &rule, EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(ok);
        assert!(errs.is_empty());
    }

    #[test]
    fn not_passes_when_sub_rule_fails() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let rule = rule_from_json(r#"{"not": {"type": "file"}}"#);
        let (ok, _) = validate_path("missing", &rule, EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(ok);
    }

    #[test]
    fn details_false_suppresses_nested_errors() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let rule = rule_from_json(r#"{"allOf": [{"type": "file"}], "details": false}"#);
        let (ok, errs) = validate_path("missing", &rule, EvalCtx::fresh(), &adapter, &conv, None, "").unwrap();
        assert!(!ok);
        assert_eq!(errs.len(), 1);
        assert!(errs.contains_key("/allOf"));
    }

    #[test]
    fn custom_description_on_failed_match_is_a_validation_error_not_an_abort() {
        let adapter = MemDir { files: HashSet::new(), dirs: HashSet::new() };
        let conv = MetaConvention::default();
        let rule = rule_from_json(
            r#"{"match": "a_.+", "description": "name must start with 'a_'"}"#,
        );
        let (ok, errs) =
            validate_path("blub", &rule, EvalCtx::fresh(), &adapter, &conv, None, "").expect(
                "a non-matching custom-description rule must report a validation error, not abort the run",
            );
        assert!(!ok);
        let err = errs.get("/").expect("expected an error at the root location");
        match &err.err {
            ErrMessage::Msg(m) => assert_eq!(m, "name must start with 'a_'"),
            ErrMessage::Json(_) => panic!("expected a plain message"),
        }
    }
}
