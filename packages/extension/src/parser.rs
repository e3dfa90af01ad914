//! Handler table for extension spec files.
//!
//! Every tag of the spec vocabulary maps to a start and/or end handler
//! that populates an [`Extension`]. `<maintainer>` and `<release>` build
//! their objects on the helper stack and attach them when they close.

use std::fs;
use std::path::Path;

use codegen_xmlparser::{
    Attributes, HandlerRegistry, HelperStack, ParseError, ParserConfig,
    ParserContext,
};

use crate::config::EXTENSION_ATTRIBUTES;
use crate::error::ModelError;
use crate::text::linetrim;
use crate::types::{
    CodePosition, CodeRole, Extension, Header, Library, License, Maintainer, Platform, Release,
};

/// Objects under construction while their element is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Helper {
    Maintainer(Maintainer),
    Release(Release),
}

/// Registry type used for extension specs.
pub type ExtensionRegistry = HandlerRegistry<Extension, Helper>;

fn current_maintainer(helpers: &mut HelperStack<Helper>) -> Result<&mut Maintainer, ModelError> {
    match helpers.current_mut() {
        Some(Helper::Maintainer(m)) => Ok(m),
        _ => Err(ModelError::MissingHelper("maintainer".to_string())),
    }
}

fn current_release(helpers: &mut HelperStack<Helper>) -> Result<&mut Release, ModelError> {
    match helpers.current_mut() {
        Some(Helper::Release(r)) => Ok(r),
        _ => Err(ModelError::MissingHelper("release".to_string())),
    }
}

fn required<'a>(attrs: &'a Attributes, tag: &str, attribute: &str) -> Result<&'a str, ModelError> {
    attrs
        .get(attribute)
        .ok_or_else(|| ModelError::MissingAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        })
}

/// Read the file named by a `src` attribute, relative to the document
/// that contains the tag.
fn read_source_file(src: &str, document: &str) -> Result<String, ModelError> {
    let path = Path::new(src);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(document)
            .parent()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|| path.to_path_buf())
    };

    fs::read_to_string(&path).map_err(|e| ModelError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Build the handler table for the extension spec vocabulary.
#[must_use]
pub fn create_extension_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    register_extension_handlers(&mut registry);
    register_maintainer_handlers(&mut registry);
    register_release_handlers(&mut registry);
    register_code_handlers(&mut registry);
    register_deps_handlers(&mut registry);
    registry
}

fn register_extension_handlers(registry: &mut ExtensionRegistry) {
    registry
        .on_start("extension", |cx, attrs| {
            if let Some(attribute) = attrs.unexpected(EXTENSION_ATTRIBUTES).first() {
                return Err(ModelError::UnexpectedAttribute {
                    tag: "extension".to_string(),
                    attribute: (*attribute).to_string(),
                }
                .into());
            }

            let name = required(attrs, "extension", "name")?;
            cx.target.set_name(name.trim())?;

            if let Some(prefix) = attrs.get("prefix") {
                cx.target.set_prefix(prefix.trim())?;
            }

            match attrs.get("version") {
                Some(version) => cx.target.set_version(version.trim())?,
                None => tracing::warn!(
                    assumed = %cx.target.version,
                    "no 'version' attribute given for <extension>, this may lead to \
                     compile errors if the spec file was created for an older version"
                ),
            }
            Ok(())
        })
        .on_start("extension/name", |_, _| {
            Err(ModelError::Unsupported(
                "extension <name> tag is no longer supported, use the 'name' attribute of \
                 <extension> instead"
                    .to_string(),
            )
            .into())
        })
        .on_end("extension/summary", |cx, data| {
            cx.target.set_summary(&linetrim(data.text)).map_err(Into::into)
        })
        .on_end("extension/description", |cx, data| {
            cx.target.set_description(&linetrim(data.text)).map_err(Into::into)
        })
        .on_start("extension/changelog", |cx, _| {
            cx.capture_verbatim();
            Ok(())
        })
        .on_end("extension/changelog", |cx, data| {
            cx.target.set_changelog(&linetrim(data.text)).map_err(Into::into)
        })
        .on_end("license", |cx, data| {
            let license = License::from_name(data.text.trim())?;
            cx.target.set_license(license).map_err(Into::into)
        });
}

fn register_maintainer_handlers(registry: &mut ExtensionRegistry) {
    registry
        .on_start("maintainer", |cx, _| {
            cx.helpers.push(Helper::Maintainer(Maintainer::new()));
            Ok(())
        })
        .on_end("maintainer/user", |cx, data| {
            current_maintainer(cx.helpers)?.set_user(data.text.trim()).map_err(Into::into)
        })
        .on_end("maintainer/name", |cx, data| {
            current_maintainer(cx.helpers)?.set_name(data.text.trim()).map_err(Into::into)
        })
        .on_end("maintainer/email", |cx, data| {
            current_maintainer(cx.helpers)?.set_email(data.text.trim()).map_err(Into::into)
        })
        .on_end("maintainer/role", |cx, data| {
            current_maintainer(cx.helpers)?.set_role(data.text.trim()).map_err(Into::into)
        })
        .on_end("maintainer", |cx, _| match cx.helpers.pop() {
            Some(Helper::Maintainer(maintainer)) => {
                cx.target.add_maintainer(maintainer).map_err(Into::into)
            }
            _ => Err(ModelError::MissingHelper("maintainer".to_string()).into()),
        })
        .on_end("maintainers", |_, _| Ok(()));
}

fn register_release_handlers(registry: &mut ExtensionRegistry) {
    registry
        .on_start("extension/release", |cx, _| {
            cx.helpers.push(Helper::Release(Release::new()));
            Ok(())
        })
        .on_end("release/version", |cx, data| {
            current_release(cx.helpers)?.set_version(data.text.trim()).map_err(Into::into)
        })
        .on_end("release/date", |cx, data| {
            current_release(cx.helpers)?.set_date(data.text.trim()).map_err(Into::into)
        })
        .on_end("release/state", |cx, data| {
            current_release(cx.helpers)?.set_state(data.text.trim()).map_err(Into::into)
        })
        .on_end("release/notes", |cx, data| {
            current_release(cx.helpers)?.set_notes(&linetrim(data.text)).map_err(Into::into)
        })
        .on_end("extension/release", |cx, _| match cx.helpers.pop() {
            Some(Helper::Release(release)) => cx.target.set_release(release).map_err(Into::into),
            _ => Err(ModelError::MissingHelper("release".to_string()).into()),
        });
}

fn register_code_handlers(registry: &mut ExtensionRegistry) {
    registry.on_end("extension/code", |cx, data| {
        let role = CodeRole::parse(data.attributes.get("role").unwrap_or("code"))?;
        let position = CodePosition::parse(data.attributes.get("position").unwrap_or("bottom"))?;

        let text = match data.attributes.get("src") {
            Some(src) => linetrim(&read_source_file(src, data.source)?),
            None => linetrim(data.text),
        };
        cx.target.add_code(role, position, &text).map_err(Into::into)
    });
}

fn register_deps_handlers(registry: &mut ExtensionRegistry) {
    registry
        .on_start("deps", |cx, attrs| {
            if let Some(platform) = attrs.get("platform") {
                cx.target.set_platform(platform)?;
            }
            if let Some(language) = attrs.get("language") {
                cx.target.set_language(language)?;
            }
            Ok(())
        })
        .on_start("deps/file", |cx, attrs| {
            let name = required(attrs, "file", "name")?;
            cx.target.add_source_file(name).map_err(Into::into)
        })
        .on_start("deps/lib", |cx, attrs| {
            let name = required(attrs, "lib", "name")?;
            let platform = match attrs.get("platform") {
                Some(platform) => Platform::parse(platform)?,
                None => Platform::ALL,
            };
            cx.target.add_library(Library {
                name: name.to_string(),
                platform,
            }).map_err(Into::into)
        })
        .on_start("deps/header", |cx, attrs| {
            let name = required(attrs, "header", "name")?;
            cx.target.add_header(Header {
                name: name.to_string(),
                path: attrs.get("path").map(str::to_string),
            }).map_err(Into::into)
        });
}

/// Parse an extension spec file.
///
/// # Errors
/// Returns the first error of the parse, located in the document it
/// occurred in.
pub fn parse_extension_file(path: &Path, config: ParserConfig) -> Result<Extension, ParseError> {
    let registry = create_extension_registry();
    let mut extension = Extension::new();
    ParserContext::new(&registry, &mut extension)
        .with_config(config)
        .parse(&path.display().to_string())?;
    Ok(extension)
}

/// Parse an extension spec held in memory. Inclusions are resolved as
/// files relative to `id`.
///
/// # Errors
/// Returns the first error of the parse.
pub fn parse_extension_str(id: &str, text: &str) -> Result<Extension, ParseError> {
    let registry = create_extension_registry();
    let mut extension = Extension::new();
    ParserContext::new(&registry, &mut extension).parse_str(id, text)?;
    Ok(extension)
}
