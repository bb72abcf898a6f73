use std::sync::Arc;

use netrun_core::{Source, SourceClass, SourceClassArgs};

/// The reference source class: a plain in-memory tag with no protocol
/// decoding at all, used by `InternalController` and by tests as the
/// worked example other source types follow. It only ever uses
/// `DefaultInterface` and otherwise behaves exactly like the base source.
pub const DICT_SOURCE_TYPE: &str = "DictSource";

pub fn dict_source_class() -> SourceClass {
    SourceClass::new(
        DICT_SOURCE_TYPE,
        Arc::new(|args: SourceClassArgs<'_>| {
            Source::new(args.key, args.controller, args.rule, DICT_SOURCE_TYPE)
        }),
    )
}
