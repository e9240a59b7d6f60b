//! Integration tests for packcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn packcache() -> Command {
        cargo_bin_cmd!("packcache")
    }

    /// Command using a config path that does not exist (defaults apply)
    fn with_defaults(temp: &TempDir) -> Command {
        let mut cmd = packcache();
        cmd.env_remove("PACKCACHE_CONFIG")
            .arg("--config")
            .arg(temp.path().join("missing.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        packcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("pack game mods"));
    }

    #[test]
    fn version_displays() {
        packcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("packcache"));
    }

    #[test]
    fn games_lists_default_catalog() {
        let temp = TempDir::new().unwrap();
        with_defaults(&temp)
            .args(["games", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mhk_1").and(predicate::str::contains("mhk_2.de")));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        with_defaults(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("missing.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        with_defaults(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn mods_unknown_game() {
        let temp = TempDir::new().unwrap();
        with_defaults(&temp)
            .args(["mods", "mhk_9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nmax_entries = 0\n").unwrap();

        packcache()
            .arg("--config")
            .arg(&path)
            .arg("games")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

#[cfg(unix)]
mod pack_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A sandbox with one game (`g1.en`, mods `a`, `b`) and a scripted packer
    struct Sandbox {
        temp: TempDir,
        config: PathBuf,
    }

    impl Sandbox {
        fn new(packer_script: impl FnOnce(&Path) -> String) -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path();
            fs::create_dir_all(root.join("data")).unwrap();
            fs::write(root.join("data").join("g1.dat"), b"original").unwrap();
            for id in ["a", "b"] {
                fs::create_dir_all(root.join("mods").join("g1").join(id)).unwrap();
            }
            let script = root.join("packer.sh");
            fs::write(&script, packer_script(root)).unwrap();

            let config = root.join("config.toml");
            fs::write(
                &config,
                format!(
                    r#"
[packer]
binary = "/bin/sh"
leading_args = ["{script}"]
timeout_secs = 30

[cache]
root_dir = "{cache}"
max_entries = 4
max_age_secs = 3600

[catalog]
data_root = "{data}"
mods_root = "{mods}"

[[catalog.games]]
id = "g1.en"
name = "Game One"
datafile = "g1.dat"
mods_folder = "g1"
out_filename = "out.dat"
"#,
                    script = script.display(),
                    cache = root.join("cache").display(),
                    data = root.join("data").display(),
                    mods = root.join("mods").display(),
                ),
            )
            .unwrap();

            Self { temp, config }
        }

        fn root(&self) -> &Path {
            self.temp.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("packcache");
            cmd.env_remove("PACKCACHE_CONFIG")
                .arg("--config")
                .arg(&self.config);
            cmd
        }

        fn invocations(&self) -> usize {
            fs::read_to_string(self.root().join("calls"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }
    }

    /// Records each call, checks the short game id and copies the data file
    fn copying_packer(root: &Path) -> String {
        format!(
            "echo call >> '{}'\n[ \"$1\" = packmod ] && [ \"$2\" = g1 ] || exit 7\ncp \"$3\" \"$4\"\n",
            root.join("calls").display()
        )
    }

    #[test]
    fn pack_prints_artifact_path() {
        let sandbox = Sandbox::new(copying_packer);
        let dest = sandbox.root().join("copy.dat");

        sandbox
            .cmd()
            .args(["pack", "g1.en", "b", "a", "--output"])
            .arg(&dest)
            .assert()
            .success()
            .stdout(predicate::str::contains("out.dat"));

        assert_eq!(fs::read(&dest).unwrap(), b"original");
        assert_eq!(sandbox.invocations(), 1);
    }

    #[test]
    fn pack_without_valid_mods() {
        let sandbox = Sandbox::new(copying_packer);

        sandbox
            .cmd()
            .args(["pack", "g1.en", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No valid mods selected"));

        assert_eq!(sandbox.invocations(), 0);
    }

    #[test]
    fn pack_failure_shows_packer_stderr() {
        let sandbox = Sandbox::new(|_| "echo 'bad mod' >&2\nexit 1\n".to_string());

        sandbox
            .cmd()
            .args(["pack", "g1.en", "a"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("bad mod"));
    }

    #[test]
    fn pack_clean_exit_without_output() {
        let sandbox = Sandbox::new(|_| "exit 0\n".to_string());

        sandbox
            .cmd()
            .args(["pack", "g1.en", "a"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("output file was not created"));
    }

    #[test]
    fn serve_answers_tagged_requests() {
        let sandbox = Sandbox::new(copying_packer);

        sandbox
            .cmd()
            .arg("serve")
            .write_stdin("pack g1.en a b\n# comment\n\nbogus\nquit\npack g1.en a\n")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("1 ok miss ")
                    .and(predicate::str::contains("out.dat"))
                    .and(predicate::str::contains("2 err unknown request `bogus`")),
            );

        // `quit` stops reading, so the trailing request is never packed
        assert_eq!(sandbox.invocations(), 1);
    }

    #[test]
    fn mods_lists_discovered_mods() {
        let sandbox = Sandbox::new(|_| "exit 0\n".to_string());

        sandbox
            .cmd()
            .args(["mods", "g1.en", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("a\nb\n"));
    }
}
