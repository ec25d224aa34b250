//! Homebrew formula rendering.
//!
//! Renders a [`FormulaDescriptor`] as the Ruby formula Homebrew consumes.

use std::fmt::Write as _;

use crate::artifact::ReleaseArtifact;
use crate::descriptor::FormulaDescriptor;
use crate::platform::{Arch, Os};

/// Homebrew formula generator.
pub struct FormulaGenerator;

impl FormulaGenerator {
    /// Generates a Ruby formula from the descriptor.
    #[must_use]
    pub fn generate(descriptor: &FormulaDescriptor) -> String {
        let mut formula = format!(
            r#"class {} < Formula
  desc "{}"
  homepage "{}"
  version "{}"
"#,
            class_name(&descriptor.name),
            escape(&descriptor.desc),
            escape(&descriptor.homepage),
            escape(&descriptor.version),
        );

        for (os, block) in [(Os::Darwin, "on_macos"), (Os::Linux, "on_linux")] {
            let records = descriptor.records_for(os);
            if records.is_empty() {
                continue;
            }
            let _ = write!(formula, "\n  {block} do\n");
            push_arch_branch(&mut formula, &records, descriptor);
            formula.push_str("  end\n");
        }

        let binary = escape(descriptor.binary_name());
        let _ = write!(
            formula,
            "\n  def install\n    bin.install \"{binary}\"\n  end\n\n"
        );
        // #{bin} is Ruby interpolation and must survive literally
        let _ = write!(
            formula,
            "  test do\n    system \"#{{bin}}/{binary}\", \"--help\"\n  end\nend\n"
        );

        formula
    }
}

/// Emit the `Hardware::CPU.arm?` branch for one OS block.
fn push_arch_branch(out: &mut String, records: &[&ReleaseArtifact], descriptor: &FormulaDescriptor) {
    let arm = records.iter().find(|a| a.arch == Arch::Arm64);
    let intel = records.iter().find(|a| a.arch == Arch::Amd64);

    match (arm, intel) {
        (Some(arm), Some(intel)) => {
            out.push_str("    if Hardware::CPU.arm?\n");
            push_source(out, arm, descriptor, 6);
            out.push_str("    else\n");
            push_source(out, intel, descriptor, 6);
            out.push_str("    end\n");
        }
        (Some(arm), None) => {
            out.push_str("    if Hardware::CPU.arm?\n");
            push_source(out, arm, descriptor, 6);
            out.push_str("    end\n");
        }
        (None, Some(intel)) => {
            out.push_str("    if Hardware::CPU.intel?\n");
            push_source(out, intel, descriptor, 6);
            out.push_str("    end\n");
        }
        (None, None) => {}
    }
}

fn push_source(out: &mut String, artifact: &ReleaseArtifact, descriptor: &FormulaDescriptor, indent: usize) {
    let pad = " ".repeat(indent);
    let _ = writeln!(
        out,
        "{pad}url \"{}\"",
        escape(&artifact.expanded_url(&descriptor.version))
    );
    let _ = writeln!(out, "{pad}sha256 \"{}\"", escape(&artifact.sha256));
}

/// Ruby class name for a formula name ("jfrm" -> "Jfrm", "my-tool" -> "MyTool").
#[must_use]
pub fn class_name(name: &str) -> String {
    name.split(['-', '_', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn test_generate_builtin_matches_published_formula() {
        let formula = FormulaGenerator::generate(&FormulaDescriptor::builtin());

        assert!(formula.starts_with("class Jfrm < Formula\n"));
        assert!(formula.contains(
            "desc \"JFrog Release Manager - Manage releases and dependencies for JFrog projects\""
        ));
        assert!(formula.contains("homepage \"https://github.com/bhanurp/jfrm\""));
        assert!(formula.contains("version \"0.0.1\""));
        assert!(formula.contains("on_macos do"));
        assert!(formula.contains("on_linux do"));
        assert!(formula.contains(
            "url \"https://github.com/bhanurp/jfrm/releases/download/v0.0.1/jfrm_darwin_arm64.tar.gz\""
        ));
        assert!(formula.contains(
            "url \"https://github.com/bhanurp/jfrm/releases/download/v0.0.1/jfrm_linux_amd64.tar.gz\""
        ));
        assert_eq!(formula.matches("sha256 \"YOUR_SHA256_HERE\"").count(), 4);
        assert_eq!(formula.matches("if Hardware::CPU.arm?").count(), 2);
        assert!(formula.contains("bin.install \"jfrm\""));
        assert!(formula.contains("system \"#{bin}/jfrm\", \"--help\""));
        assert!(formula.ends_with("end\nend\n"));
    }

    #[test]
    fn test_arm_branch_precedes_intel() {
        let formula = FormulaGenerator::generate(&FormulaDescriptor::builtin());
        let arm = formula.find("jfrm_darwin_arm64").unwrap();
        let intel = formula.find("jfrm_darwin_amd64").unwrap();
        assert!(arm < intel);
    }

    #[test]
    fn test_generate_linux_only() {
        let mut d = FormulaDescriptor::builtin();
        d.artifacts.retain(|a| a.os == Os::Linux);

        let formula = FormulaGenerator::generate(&d);
        assert!(!formula.contains("on_macos do"));
        assert!(formula.contains("on_linux do"));
    }

    #[test]
    fn test_generate_single_intel_record() {
        let mut d = FormulaDescriptor::builtin();
        d.artifacts
            .retain(|a| a.platform() == Platform::new(Os::Darwin, Arch::Amd64));

        let formula = FormulaGenerator::generate(&d);
        assert!(formula.contains("if Hardware::CPU.intel?"));
        assert!(!formula.contains("else"));
    }

    #[test]
    fn test_generate_custom_binary() {
        let mut d = FormulaDescriptor::builtin();
        d.binary = Some("jfrm-cli".to_string());
        let formula = FormulaGenerator::generate(&d);
        assert!(formula.contains("bin.install \"jfrm-cli\""));
        assert!(formula.contains("#{bin}/jfrm-cli"));
    }

    #[test]
    fn test_quotes_are_escaped() {
        let mut d = FormulaDescriptor::builtin();
        d.desc = "Say \"hi\"".to_string();
        let formula = FormulaGenerator::generate(&d);
        assert!(formula.contains(r#"desc "Say \"hi\"""#));
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("jfrm"), "Jfrm");
        assert_eq!(class_name("my-tool"), "MyTool");
        assert_eq!(class_name("a_b.c"), "ABC");
    }
}
