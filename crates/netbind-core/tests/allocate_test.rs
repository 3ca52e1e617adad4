#![allow(clippy::unwrap_used)]
// Allocation, rollback and deallocation against the in-memory service.

mod common;

use pretty_assertions::assert_eq;

use netbind_core::{AllocateRequest, CoreError, ErrorKind, RequestedNetwork};

use common::{
    INSTANCE_UUID, ctx, extension, harness, instance, network, port, security_group, subnet,
    two_networks,
};

// ── Happy paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_two_networks_second_with_fixed_ip() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network_with_ip("net-b", "10.0.0.5"),
        ],
        ..AllocateRequest::default()
    };

    let info = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    let ports = h.service.ports();
    assert_eq!(ports.len(), 2);
    assert_eq!(ports[0].network_id, "net-a");
    assert_eq!(ports[1].network_id, "net-b");
    assert!(ports[1].has_fixed_address("10.0.0.5"));
    assert!(ports.iter().all(|p| p.bound_device() == Some(INSTANCE_UUID)));
    assert!(
        ports
            .iter()
            .all(|p| p.device_owner.as_deref() == Some("compute:nova"))
    );

    assert_eq!(info.network_ids(), vec!["net-a".to_string(), "net-b".to_string()]);
    let second_ips: Vec<&str> = info.vifs()[1]
        .fixed_ips()
        .map(|ip| ip.address.as_str())
        .collect();
    assert_eq!(second_ips, vec!["10.0.0.5"]);
}

#[tokio::test]
async fn test_requested_order_is_preserved() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-b"),
            RequestedNetwork::network("net-a"),
        ],
        ..AllocateRequest::default()
    };

    let info = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(info.network_ids(), vec!["net-b".to_string(), "net-a".to_string()]);
}

#[tokio::test]
async fn test_unknown_requested_network_fails_before_any_port() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-missing"),
        ],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NetworkNotFound { ref ids } if ids == "net-missing"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(h.service.ports().is_empty());
    assert_eq!(h.service.count_calls("create_port"), 0);
    assert_eq!(h.service.count_calls("update_port"), 0);
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_repeated_network_gets_one_port() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-a"),
        ],
        ..AllocateRequest::default()
    };

    let info = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(h.service.count_calls("create_port"), 1);
    assert_eq!(info.network_ids(), vec!["net-a".to_string()]);
}

#[tokio::test]
async fn test_without_request_uses_private_then_shared() {
    let service = two_networks().with(|st| {
        st.networks.insert(0, common::shared_network("net-shared", &["sub-s"]));
        st.subnets.push(subnet("sub-s", "net-shared", "192.168.0.0/24"));
    });
    let h = harness(service);

    let info = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &AllocateRequest::default())
        .await
        .unwrap();

    assert_eq!(
        info.network_ids(),
        vec![
            "net-a".to_string(),
            "net-b".to_string(),
            "net-shared".to_string()
        ]
    );
}

#[tokio::test]
async fn test_existing_port_is_bound_not_created() {
    let service = two_networks().with(|st| {
        st.ports.push(port("port-123", "net-a", "aa:bb:cc:dd:ee:ff", None));
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![RequestedNetwork::port("port-123")],
        macs: Some(vec!["aa:bb:cc:dd:ee:ff".into()]),
        ..AllocateRequest::default()
    };

    let info = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(h.service.count_calls("create_port"), 0);
    let bound = h.service.port("port-123").unwrap();
    assert_eq!(bound.bound_device(), Some(INSTANCE_UUID));
    assert_eq!(info.len(), 1);
    assert_eq!(info.vifs()[0].id, "port-123");
}

#[tokio::test]
async fn test_binding_and_qos_capabilities_shape_port_body() {
    let service = two_networks().with(|st| {
        st.extensions = vec![
            extension("Port Binding", "binding"),
            extension("nvp-qos", "nvp-qos"),
        ];
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![RequestedNetwork::network("net-a")],
        ..AllocateRequest::default()
    };

    h.orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    let bodies = h.service.state().created_bodies.clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].binding_host_id.as_deref(), Some("compute-1"));
    assert_eq!(bodies[0].rxtx_factor, Some(2.0));
}

#[tokio::test]
async fn test_hypervisor_macs_are_used_for_new_ports() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![RequestedNetwork::network("net-a")],
        macs: Some(vec!["aa:00:00:00:00:01".into()]),
        ..AllocateRequest::default()
    };

    h.orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(h.service.ports()[0].mac_address, "aa:00:00:00:00:01");
}

#[tokio::test]
async fn test_security_groups_are_resolved_name_first() {
    let service = two_networks().with(|st| {
        st.security_groups = vec![
            security_group("sg-1", "default"),
            // Named after the id of the group above.
            security_group("sg-2", "sg-1"),
        ];
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![RequestedNetwork::network("net-a")],
        security_groups: vec!["sg-1".into()],
        ..AllocateRequest::default()
    };

    h.orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(h.service.ports()[0].security_groups, vec!["sg-2".to_string()]);
}

#[tokio::test]
async fn test_success_notifies_security_groups_and_caches_info() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![RequestedNetwork::network("net-a")],
        ..AllocateRequest::default()
    };

    let info = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(
        h.notifier.events(),
        vec![
            "refresh:sg-default".to_string(),
            format!("add:{INSTANCE_UUID}:default")
        ]
    );
    assert_eq!(h.store.get(INSTANCE_UUID), Some(info));
}

// ── Rejections before any port is touched ───────────────────────────

#[tokio::test]
async fn test_port_with_foreign_mac_is_not_usable() {
    let service = two_networks().with(|st| {
        st.networks.push(network("net-c", &["sub-c"]));
        st.ports.push(port("port-123", "net-c", "fa:16:3e:12:34:56", None));
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![RequestedNetwork::port("port-123")],
        macs: Some(vec!["aa:bb:cc:dd:ee:ff".into()]),
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PortNotUsable { ref port_id, .. } if port_id == "port-123"));
    assert!(h.service.calls().iter().all(|c| !c.contains("_port:")));
    assert!(h.service.port("port-123").unwrap().bound_device().is_none());
}

#[tokio::test]
async fn test_ambiguous_security_group_fails_before_ports() {
    let service = two_networks().with(|st| {
        st.security_groups = vec![
            security_group("sg-1", "default"),
            security_group("sg-2", "web"),
            security_group("sg-3", "web"),
        ];
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-b"),
        ],
        security_groups: vec!["default".into(), "web".into()],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Ambiguous);
    assert!(matches!(err, CoreError::NoUniqueMatch { .. }));
    assert_eq!(h.service.count_calls("create_port"), 0);
    assert!(h.service.ports().is_empty());
}

#[tokio::test]
async fn test_security_groups_need_subnets_on_every_network() {
    let service = two_networks().with(|st| {
        st.networks.push(network("net-empty", &[]));
        st.security_groups = vec![security_group("sg-1", "default")];
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-empty"),
        ],
        security_groups: vec!["default".into()],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::SecurityGroupCannotBeApplied));
    assert!(h.service.ports().is_empty());
}

#[tokio::test]
async fn test_port_security_disabled_rejects_security_groups() {
    let service = two_networks().with(|st| {
        st.networks[1].port_security_enabled = Some(false);
        st.security_groups = vec![security_group("sg-1", "default")];
    });
    let h = harness(service);
    let request = AllocateRequest {
        security_groups: vec!["sg-1".into()],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PolicyViolation);
    assert!(h.service.ports().is_empty());
}

#[tokio::test]
async fn test_empty_project_is_invalid_input() {
    let h = harness(two_networks());
    let mut inst = instance();
    inst.project_id = String::new();

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &inst, &AllocateRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(h.service.calls().is_empty());
}

// ── Rollback ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_create_rolls_back_touched_and_created() {
    let service = two_networks().with(|st| {
        st.networks.push(network("net-c", &["sub-c"]));
        st.subnets.push(subnet("sub-c", "net-c", "10.0.2.0/24"));
        st.extensions = vec![extension("Port Binding", "binding")];
        st.ports.push(port("port-pre", "net-a", "fa:16:3e:00:00:aa", None));
        st.fail_create_on_network = Some("net-c".into());
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::port("port-pre"),
            RequestedNetwork::network("net-b"),
            RequestedNetwork::network("net-c"),
        ],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    // The original failure comes back unchanged.
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));

    let ports = h.service.ports();
    assert_eq!(ports.len(), 1, "created port must be deleted: {ports:?}");
    let pre = &ports[0];
    assert_eq!(pre.id, "port-pre");
    assert!(pre.bound_device().is_none());
    assert!(pre.binding_host_id.is_none());
    assert!(h.store.get(INSTANCE_UUID).is_none());
}

#[tokio::test]
async fn test_bind_failure_on_existing_port_leaves_nothing_behind() {
    let service = two_networks().with(|st| {
        st.ports.push(port("port-pre", "net-a", "fa:16:3e:00:00:aa", None));
        st.fail_create_on_network = Some("net-b".into());
        st.fail_update_ports.insert("port-pre".into());
    });
    let h = harness(service);
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::port("port-pre"),
            RequestedNetwork::network("net-b"),
        ],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    // Nothing was mutated before the failing bind.
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    assert_eq!(h.service.count_calls("create_port"), 0);
}

#[tokio::test]
async fn test_mac_pool_exhaustion_rolls_back() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-b"),
        ],
        macs: Some(vec!["aa:00:00:00:00:01".into()]),
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PortNotFree { .. }));
    assert_eq!(err.kind(), ErrorKind::Exhausted);
    assert!(h.service.ports().is_empty());
    assert_eq!(h.service.count_calls("delete_port"), 1);
}

#[tokio::test]
async fn test_delete_failure_during_rollback_is_swallowed() {
    let service = two_networks().with(|st| {
        st.networks.push(network("net-c", &["sub-c"]));
        st.fail_create_on_network = Some("net-c".into());
    });
    let h = harness(service);
    // The first created port gets id "port-1".
    h.service
        .state()
        .fail_delete_ports
        .insert("port-1".into());

    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-b"),
            RequestedNetwork::network("net-c"),
        ],
        ..AllocateRequest::default()
    };

    let err = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    // Both deletes were attempted; only the second succeeded.
    assert_eq!(h.service.count_calls("delete_port"), 2);
    let left: Vec<String> = h.service.ports().into_iter().map(|p| p.id).collect();
    assert_eq!(left, vec!["port-1".to_string()]);
}

// ── Deallocation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_deallocate_deletes_all_instance_ports() {
    let service = two_networks().with(|st| {
        st.ports.push(port("p-1", "net-a", "fa:16:3e:00:00:01", Some(INSTANCE_UUID)));
        st.ports.push(port("p-2", "net-b", "fa:16:3e:00:00:02", Some(INSTANCE_UUID)));
        st.ports.push(port("p-other", "net-b", "fa:16:3e:00:00:03", Some("inst-9")));
        st.fail_delete_ports.insert("p-1".into());
    });
    let h = harness(service);

    h.orchestrator
        .deallocate_for_instance(&ctx(), &instance())
        .await
        .unwrap();

    let left: Vec<String> = h.service.ports().into_iter().map(|p| p.id).collect();
    assert_eq!(left, vec!["p-1".to_string(), "p-other".to_string()]);
    assert_eq!(
        h.notifier.events(),
        vec![
            "refresh:sg-default".to_string(),
            format!("remove:{INSTANCE_UUID}:default")
        ]
    );
    assert!(h.store.get(INSTANCE_UUID).unwrap().is_empty());
}

#[tokio::test]
async fn test_reallocate_after_deallocate_keeps_membership() {
    let h = harness(two_networks());
    let request = AllocateRequest {
        requested_networks: vec![
            RequestedNetwork::network("net-a"),
            RequestedNetwork::network("net-b"),
        ],
        ..AllocateRequest::default()
    };

    let first = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();
    h.orchestrator
        .deallocate_for_instance(&ctx(), &instance())
        .await
        .unwrap();
    let second = h
        .orchestrator
        .allocate_for_instance(&ctx(), &instance(), &request)
        .await
        .unwrap();

    assert_eq!(first.network_ids(), second.network_ids());
    let first_ids: Vec<&str> = first.vifs().iter().map(|v| v.id.as_str()).collect();
    let second_ids: Vec<&str> = second.vifs().iter().map(|v| v.id.as_str()).collect();
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    assert_eq!(h.service.ports().len(), 2);
}

#[tokio::test]
async fn test_attach_returns_only_new_port_and_keeps_cached_vifs() {
    let h = harness(two_networks());
    let first = h
        .orchestrator
        .allocate_for_instance(
            &ctx(),
            &instance(),
            &AllocateRequest {
                requested_networks: vec![RequestedNetwork::network("net-a")],
                ..AllocateRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    let attached = h
        .orchestrator
        .allocate_port_for_instance(&ctx(), &instance(), None, Some("net-b"), None)
        .await
        .unwrap();

    assert_eq!(attached.network_ids(), vec!["net-b".to_string()]);
    let cached = h.store.get(INSTANCE_UUID).unwrap();
    assert_eq!(cached.network_ids(), vec!["net-a".to_string(), "net-b".to_string()]);
    assert_eq!(cached.vifs()[0], first.vifs()[0]);
}

#[tokio::test]
async fn test_deallocate_port_rebuilds_info() {
    let h = harness(two_networks());
    let info = h
        .orchestrator
        .allocate_for_instance(
            &ctx(),
            &instance(),
            &AllocateRequest {
                requested_networks: vec![
                    RequestedNetwork::network("net-a"),
                    RequestedNetwork::network("net-b"),
                ],
                ..AllocateRequest::default()
            },
        )
        .await
        .unwrap();
    let first_port = info.vifs()[0].id.clone();

    let after = h
        .orchestrator
        .deallocate_port_for_instance(&ctx(), &instance(), &first_port)
        .await
        .unwrap();

    assert_eq!(after.network_ids(), vec!["net-b".to_string()]);
    assert!(h.service.port(&first_port).is_none());
}
