//! Variables available to the Homebrew formula template

use crate::config::Config;
use crate::error::TemplateError;
use crate::types::{Platform, ReleaseAsset, ReleaseBundle};

/// Values substituted into a formula template.
///
/// Checksums are resolved lazily, so a template that never references a
/// platform does not require its checksum.
#[derive(Debug, Clone)]
pub struct FormulaVariables {
    version: String,
    tag: String,
    binary: String,
    description: String,
    owner: String,
    repo: String,
    assets: Vec<ReleaseAsset>,
}

impl FormulaVariables {
    /// Collect variables from a release bundle and its configuration
    pub fn new(bundle: &ReleaseBundle, config: &Config) -> Self {
        Self {
            version: bundle.version.clone(),
            tag: bundle.tag(),
            binary: config.assets.binary.clone(),
            description: config.formula.description.clone(),
            owner: config.target.owner.clone(),
            repo: config.target.repo.clone(),
            assets: bundle.assets.clone(),
        }
    }

    /// Look up a placeholder
    pub fn resolve(&self, name: &str) -> Result<String, TemplateError> {
        match name {
            "version" => Ok(self.version.clone()),
            "tag" => Ok(self.tag.clone()),
            "binary" => Ok(self.binary.clone()),
            "class_name" => Ok(class_name(&self.binary)),
            "description" => Ok(self.description.clone()),
            "owner" => Ok(self.owner.clone()),
            "repo" => Ok(self.repo.clone()),
            other => self.resolve_platform(other),
        }
    }

    fn resolve_platform(&self, name: &str) -> Result<String, TemplateError> {
        let unknown = || TemplateError::UnknownVariable(name.to_string());

        let (key, field) = name.rsplit_once('_').ok_or_else(unknown)?;
        let platform = Platform::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(unknown)?;
        let asset = self
            .assets
            .iter()
            .find(|a| a.platform == platform)
            .ok_or_else(|| TemplateError::MissingChecksum(platform.to_string()))?;

        match field {
            "sha256" => asset
                .checksum
                .clone()
                .ok_or_else(|| TemplateError::MissingChecksum(asset.name.clone())),
            "asset" => Ok(asset.file_name()),
            _ => Err(unknown()),
        }
    }
}

/// Homebrew class name for a binary: `guilde-cli` -> `GuildeCli`
pub fn class_name(binary: &str) -> String {
    binary
        .split(['-', '_', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::FormulaTemplate;
    use crate::types::AssetNaming;
    use std::path::Path;

    fn bundle_with_checksums() -> ReleaseBundle {
        let mut bundle = ReleaseBundle::new("1.2.3", "/repo");
        bundle.create_assets(Path::new("/path"), "guilde-cli", AssetNaming::Plain);
        let sums = [
            "mac-arm-checksum",
            "mac-intel-checksum",
            "linux-arm-checksum",
            "linux-intel-checksum",
        ];
        for (asset, sum) in bundle.assets.iter_mut().zip(sums) {
            asset.checksum = Some(sum.to_string());
        }
        bundle
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("guilde-cli"), "GuildeCli");
        assert_eq!(class_name("tool"), "Tool");
        assert_eq!(class_name("my_app.x"), "MyAppX");
    }

    #[test]
    fn test_render_embedded_template() {
        let config = Config::default();
        let vars = FormulaVariables::new(&bundle_with_checksums(), &config);

        let output = FormulaTemplate::embedded().render(&vars).unwrap();

        for expected in [
            "class GuildeCli < Formula",
            "version \"1.2.3\"",
            "sha256 \"mac-arm-checksum\"",
            "sha256 \"mac-intel-checksum\"",
            "sha256 \"linux-arm-checksum\"",
            "sha256 \"linux-intel-checksum\"",
            "releases/download/v1.2.3/guilde-cli-darwin-arm64.zip",
            "bin.install \"guilde-cli\"",
            "#{bin}/guilde-cli",
        ] {
            assert!(output.contains(expected), "missing {expected:?} in:\n{output}");
        }
        assert!(!output.contains("{{"));
    }

    #[test]
    fn test_missing_checksum_fails() {
        let mut bundle = bundle_with_checksums();
        bundle.assets[2].checksum = None;
        let vars = FormulaVariables::new(&bundle, &Config::default());

        let err = FormulaTemplate::embedded().render(&vars).unwrap_err();
        assert!(
            matches!(err, TemplateError::MissingChecksum(name) if name == "guilde-cli-linux-arm64")
        );
    }

    #[test]
    fn test_unknown_platform_field() {
        let vars = FormulaVariables::new(&bundle_with_checksums(), &Config::default());
        assert!(matches!(
            vars.resolve("darwin_arm64_url"),
            Err(TemplateError::UnknownVariable(_))
        ));
        assert!(matches!(
            vars.resolve("windows_amd64_sha256"),
            Err(TemplateError::UnknownVariable(_))
        ));
        assert_eq!(vars.resolve("linux_amd64_sha256").unwrap(), "linux-intel-checksum");
    }
}
