//! local.conf layout tests

use super::{LocalConf, LocalConfError};
use crate::config::LocalConfParams;
use crate::graph::GraphError;

fn conf(yaml: &str) -> LocalConf {
    let params = LocalConfParams::from_yaml_str(yaml).unwrap();
    LocalConf::new(&params).unwrap()
}

fn line_value<'a>(conf: &'a LocalConf, key: &str) -> Option<&'a str> {
    let prefix = format!("{}=", key);
    conf.localrc()
        .iter()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
}

#[cfg(test)]
mod localrc_tests {
    use super::*;

    #[test]
    fn values_are_quoted_once() {
        let conf = conf("localrc:\n  TESTVAR: '\"quoted value\"'\n  PLAIN: value\n");
        assert_eq!(line_value(&conf, "TESTVAR"), Some("\"quoted value\""));
        assert_eq!(line_value(&conf, "PLAIN"), Some("\"value\""));
    }

    #[test]
    fn variables_follow_their_references() {
        let conf = conf(
            r#"
localrc:
  LOGFILE: $LOGDIR/stack.sh.log
  LOGDIR: ${DEST}/logs
  DEST: /opt/stack
  ADMIN_PASSWORD: secret
"#,
        );
        assert_eq!(
            conf.localrc(),
            &[
                "ADMIN_PASSWORD=\"secret\"",
                "DEST=\"/opt/stack\"",
                "LOGDIR=\"${DEST}/logs\"",
                "LOGFILE=\"$LOGDIR/stack.sh.log\"",
            ]
        );
    }

    #[test]
    fn circular_variables_abort() {
        let params = LocalConfParams::from_yaml_str("localrc:\n  A: $B\n  B: $A\n").unwrap();
        let err = LocalConf::new(&params).unwrap_err();
        assert!(matches!(
            err,
            LocalConfError::Variables(GraphError::CycleDetected { ref name }) if name == "B"
        ));
    }

    #[test]
    fn libs_from_git_is_generated() {
        let conf = conf(
            r#"
base_services: []
projects:
  git.openstack.org/openstack/nova:
    required: true
    short_name: nova
  git.openstack.org/openstack/oslo.messaging:
    required: true
    short_name: oslo.messaging
  git.openstack.org/openstack/devstack-plugin:
    required: false
    short_name: devstack-plugin
project:
  short_name: glance
"#,
        );
        assert_eq!(
            line_value(&conf, "LIBS_FROM_GIT"),
            Some("nova,oslo.messaging,glance")
        );
    }

    #[test]
    fn project_under_test_is_not_repeated() {
        let conf = conf(
            r#"
projects:
  opendev.org/openstack/nova:
    required: true
    short_name: nova
project:
  short_name: nova
"#,
        );
        assert_eq!(line_value(&conf, "LIBS_FROM_GIT"), Some("nova"));
    }

    #[test]
    fn libs_from_git_can_be_overridden() {
        let conf = conf(
            r#"
localrc:
  LIBS_FROM_GIT: oslo.db
projects:
  git.openstack.org/openstack/nova:
    required: true
    short_name: nova
"#,
        );
        let lines: Vec<_> = conf
            .localrc()
            .iter()
            .filter(|line| line.starts_with("LIBS_FROM_GIT"))
            .collect();
        assert_eq!(lines, vec!["LIBS_FROM_GIT=\"oslo.db\""]);
    }

    #[test]
    fn no_projects_means_no_libs_from_git() {
        let conf = conf("projects: {}\n");
        assert!(line_value(&conf, "LIBS_FROM_GIT").is_none());
    }

    #[test]
    fn tempest_plugins_are_joined_under_base_dir() {
        let conf = conf(
            "base_dir: ./test\ntempest_plugins: [heat-tempest-plugin, sahara-tests]\n",
        );
        assert_eq!(
            line_value(&conf, "TEMPEST_PLUGINS"),
            Some("\"./test/heat-tempest-plugin ./test/sahara-tests\"")
        );
        assert!(conf.warnings().is_empty());
    }

    #[test]
    fn tempest_plugins_from_localrc_win_with_warning() {
        let conf = conf(
            r#"
base_dir: ./test
localrc:
  TEMPEST_PLUGINS: someplugin
tempest_plugins: [heat-tempest-plugin, sahara-tests]
"#,
        );
        let lines: Vec<_> = conf
            .localrc()
            .iter()
            .filter(|line| line.starts_with("TEMPEST_PLUGINS"))
            .collect();
        assert_eq!(lines, vec!["TEMPEST_PLUGINS=\"someplugin\""]);
        assert_eq!(conf.warnings().len(), 1);
        assert!(conf.warnings()[0].contains("someplugin"));
    }
}

#[cfg(test)]
mod services_tests {
    use super::*;

    #[test]
    fn base_services_are_enabled_by_default() {
        let conf = conf("base_services: [key, mysql]\nservices:\n  cinder: true\n  swift: false\n");
        assert_eq!(
            conf.localrc(),
            &[
                "ENABLED_SERVICES=key,mysql",
                "enable_service cinder",
                "disable_service swift",
            ]
        );
    }

    #[test]
    fn base_false_disables_everything_first() {
        let conf = conf("base_services: [key]\nservices:\n  base: false\n  cinder: true\n");
        assert_eq!(conf.localrc(), &["disable_all_services", "enable_service cinder"]);
    }

    #[test]
    fn empty_base_services_disable_all() {
        let conf = conf("base_services: []\nservices:\n  cinder: true\n");
        assert_eq!(conf.localrc(), &["disable_all_services", "enable_service cinder"]);
    }

    #[test]
    fn non_boolean_service_settings_are_skipped() {
        let conf = conf("services:\n  cinder: maybe\n");
        assert_eq!(conf.localrc(), &["disable_all_services"]);
    }

    #[test]
    fn yaml_1_1_switch_words_toggle_services() {
        let conf = conf("base_services: [key]\nservices:\n  base: 'no'\n  cinder: 'yes'\n  swift: 'off'\n");
        assert_eq!(
            conf.localrc(),
            &["disable_all_services", "enable_service cinder", "disable_service swift"]
        );
    }

    #[test]
    fn nothing_emitted_without_services() {
        let conf = conf("base_services: []\n");
        assert!(conf.localrc().is_empty());
    }
}

#[cfg(test)]
mod plugins_tests {
    use super::*;

    #[test]
    fn plugins_are_enabled_alphabetically() {
        let conf = conf(
            r#"
plugins:
  bar: https://git.openstack.org/openstack/bar-plugin
  foo: https://git.openstack.org/openstack/foo-plugin
  baz: https://git.openstack.org/openstack/baz-plugin
"#,
        );
        assert_eq!(
            conf.localrc(),
            &[
                "enable_plugin bar https://git.openstack.org/openstack/bar-plugin",
                "enable_plugin baz https://git.openstack.org/openstack/baz-plugin",
                "enable_plugin foo https://git.openstack.org/openstack/foo-plugin",
            ]
        );
    }

    #[test]
    fn plugins_without_location_are_skipped() {
        let conf = conf("plugins:\n  bar: false\n  baz: ''\n  foo: https://example.org/foo\n");
        assert_eq!(conf.localrc(), &["enable_plugin foo https://example.org/foo"]);
    }

    #[test]
    fn plugins_come_before_services_and_variables() {
        let conf = conf(
            r#"
localrc:
  A: "1"
services:
  cinder: true
plugins:
  foo: https://example.org/foo
"#,
        );
        assert_eq!(
            conf.localrc(),
            &[
                "enable_plugin foo https://example.org/foo",
                "disable_all_services",
                "enable_service cinder",
                "A=\"1\"",
            ]
        );
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[test]
    fn meta_sections_are_rendered_in_input_order() {
        let conf = conf(
            r#"
localrc:
  test_localrc: "1"
local_conf:
  install:
    nova.conf:
      main:
        test_conf: "2"
  post-config:
    $NEUTRON_CONF:
      DEFAULT:
        debug: true
      agent:
        root_helper: sudo
"#,
        );

        let headers: Vec<&str> = conf.meta_sections().keys().map(String::as_str).collect();
        assert_eq!(headers, vec!["[[install|nova.conf]]", "[[post-config|$NEUTRON_CONF]]"]);

        assert_eq!(
            conf.render(),
            "[[local|localrc]]\n\
             test_localrc=\"1\"\n\
             \n\
             [[install|nova.conf]]\n\
             [main]\n\
             test_conf = 2\n\
             [[post-config|$NEUTRON_CONF]]\n\
             [DEFAULT]\n\
             debug = True\n\
             \n\
             [agent]\n\
             root_helper = sudo\n"
        );
    }

    #[test]
    fn empty_params_render_header_only() {
        let conf = conf("{}");
        assert_eq!(conf.render(), "[[local|localrc]]\n\n\n");
    }

    #[test]
    fn write_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.conf");
        let conf = conf("localrc:\n  A: b\n");
        conf.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[[local|localrc]]\nA=\"b\"\n\n");
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("local.conf");
        let err = conf("{}").write(&path).unwrap_err();
        assert!(matches!(err, LocalConfError::Write { .. }));
    }
}
