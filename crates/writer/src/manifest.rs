//! Generated manifest files

use capsule_errors::Error;
use capsule_types::{
    CompilerCapability, CompilerDescriptor, ComponentId, PackageDependencies, ResolvedComponent,
    ToolConfig,
};
use serde::Serialize;

/// Package manifest consumed by the package manager
pub const PACKAGE_JSON: &str = "package.json";

/// Tool configuration file
pub const CONFIG_FILE: &str = "capsule.json";

#[derive(Serialize)]
struct PackageManifest<'a> {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "no_dependencies")]
    dependencies: &'a PackageDependencies,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_dependencies(dependencies: &&PackageDependencies) -> bool {
    dependencies.is_empty()
}

#[derive(Serialize)]
struct ConfigManifest<'a> {
    id: &'a ComponentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<&'a CompilerDescriptor>,
}

/// Render `package.json` for a component
pub(crate) fn package_json(component: &ResolvedComponent) -> Result<String, Error> {
    let manifest = PackageManifest {
        name: component.id.package_name(),
        version: component.id.version().map(ToString::to_string),
        dependencies: &component.package_dependencies,
    };
    Ok(serde_json::to_string_pretty(&manifest)? + "\n")
}

/// Render `capsule.json` for a component
pub(crate) fn config_json(
    component: &ResolvedComponent,
    compiler: &CompilerCapability,
) -> Result<String, Error> {
    let manifest = ConfigManifest {
        id: &component.id,
        config: component.config.as_ref(),
        compiler: compiler.descriptor(),
    };
    Ok(serde_json::to_string_pretty(&manifest)? + "\n")
}

/// Render a link shim that re-exports a dependency's written directory
pub(crate) fn link_shim(target: &std::path::Path) -> Result<String, Error> {
    let target = serde_json::to_string(&target.display().to_string())?;
    Ok(format!("module.exports = require({target});\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_json_contents() {
        let component = ResolvedComponent::new("org.widgets/button@1.2.0".parse().unwrap())
            .with_package_dependency("lodash", "^4.0.0");
        let json: serde_json::Value = serde_json::from_str(&package_json(&component).unwrap()).unwrap();
        assert_eq!(json["name"], "org.widgets.button");
        assert_eq!(json["version"], "1.2.0");
        assert_eq!(json["dependencies"]["lodash"], "^4.0.0");
    }

    #[test]
    fn test_config_json_includes_compiler() {
        let component = ResolvedComponent::new("org/button@1.0.0".parse().unwrap());
        let compiler = CompilerCapability::HasCompiler(CompilerDescriptor::new("babel"));
        let json: serde_json::Value =
            serde_json::from_str(&config_json(&component, &compiler).unwrap()).unwrap();
        assert_eq!(json["id"], "org/button@1.0.0");
        assert_eq!(json["compiler"]["id"], "babel");

        let json: serde_json::Value = serde_json::from_str(
            &config_json(&component, &CompilerCapability::NoCompiler).unwrap(),
        )
        .unwrap();
        assert!(json.get("compiler").is_none());
    }

    #[test]
    fn test_link_shim_escapes_path() {
        let shim = link_shim(std::path::Path::new("/tmp/it's \"here\"")).unwrap();
        assert_eq!(shim, "module.exports = require(\"/tmp/it's \\\"here\\\"\");\n");
    }
}
