//! Conversion from Kubernetes API objects to summaries
//!
//! Every formatter is total: missing optional fields become `None` or an
//! empty list instead of failing the whole list call.

use chrono::SecondsFormat;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use kubeask_types::{
    ContainerRef, DeploymentSummary, PodPhase, PodSummary, PortMapping, ServiceSummary,
    TargetPort,
};

/// Convert a k8s Pod to PodSummary
pub fn format_pod(pod: Pod) -> PodSummary {
    let mut summary = PodSummary::new(
        pod.metadata.name.unwrap_or_default(),
        pod.metadata.namespace.unwrap_or_default(),
    );

    if let Some(spec) = pod.spec {
        summary.node = spec.node_name;
        summary.containers = spec
            .containers
            .into_iter()
            .map(|c| ContainerRef {
                name: c.name,
                image: c.image,
            })
            .collect();
    }

    if let Some(status) = pod.status {
        summary.phase = status.phase.as_deref().map(PodPhase::from);
        summary.host_ip = status.host_ip;
        summary.pod_ip = status.pod_ip;
        summary.start_time = status
            .start_time
            .map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    summary
}

/// Convert a k8s Service to ServiceSummary
pub fn format_service(svc: Service) -> ServiceSummary {
    let mut summary = ServiceSummary::new(
        svc.metadata.name.unwrap_or_default(),
        svc.metadata.namespace.unwrap_or_default(),
    );

    if let Some(spec) = svc.spec {
        summary.service_type = spec.type_;
        summary.cluster_ip = spec.cluster_ip;
        summary.external_ips = spec.external_ips.unwrap_or_default();
        summary.ports = spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| PortMapping {
                port: p.port,
                target_port: p.target_port.map(|t| match t {
                    IntOrString::Int(n) => TargetPort::Number(n),
                    IntOrString::String(s) => TargetPort::Name(s),
                }),
                protocol: p.protocol,
            })
            .collect();
    }

    summary
}

/// Convert a k8s Deployment to DeploymentSummary
pub fn format_deployment(deploy: Deployment) -> DeploymentSummary {
    let mut summary = DeploymentSummary::new(
        deploy.metadata.name.unwrap_or_default(),
        deploy.metadata.namespace.unwrap_or_default(),
    );

    if let Some(spec) = deploy.spec {
        summary.replicas = spec.replicas;
        summary.images = spec
            .template
            .spec
            .map(|pod_spec| {
                pod_spec
                    .containers
                    .into_iter()
                    .filter_map(|c| c.image)
                    .collect()
            })
            .unwrap_or_default();
    }

    if let Some(status) = deploy.status {
        summary.available_replicas = status.available_replicas;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};
    use k8s_openapi::api::core::v1::{
        Container, PodSpec, PodStatus, PodTemplateSpec, ServicePort, ServiceSpec,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

    fn meta(name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    fn container(name: &str, image: &str) -> Container {
        Container {
            name: name.to_string(),
            image: Some(image.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_running_pod() {
        let pod = Pod {
            metadata: meta("coredns-5d78c", "kube-system"),
            spec: Some(PodSpec {
                node_name: Some("node-1".to_string()),
                containers: vec![
                    container("coredns", "registry.k8s.io/coredns:v1.10.1"),
                    container("sidecar", "busybox:1.36"),
                ],
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                host_ip: Some("10.0.0.4".to_string()),
                pod_ip: Some("10.244.0.7".to_string()),
                start_time: Some(Time(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())),
                ..Default::default()
            }),
        };

        let summary = format_pod(pod);
        assert_eq!(summary.name, "coredns-5d78c");
        assert_eq!(summary.namespace, "kube-system");
        assert_eq!(summary.phase, Some(PodPhase::Running));
        assert_eq!(summary.node.as_deref(), Some("node-1"));
        assert_eq!(summary.pod_ip.as_deref(), Some("10.244.0.7"));
        assert_eq!(summary.start_time.as_deref(), Some("2024-05-01T12:30:00Z"));
        assert_eq!(summary.containers.len(), 2);
        assert_eq!(summary.containers[1].name, "sidecar");
        assert_eq!(summary.containers[1].image.as_deref(), Some("busybox:1.36"));
    }

    #[test]
    fn test_format_pod_without_spec_or_status() {
        let pod = Pod {
            metadata: meta("bare", "default"),
            ..Default::default()
        };

        let summary = format_pod(pod);
        assert_eq!(summary.phase, None);
        assert_eq!(summary.node, None);
        assert_eq!(summary.start_time, None);
        assert!(summary.containers.is_empty());
    }

    #[test]
    fn test_format_pod_unrecognised_phase() {
        let pod = Pod {
            metadata: meta("odd", "default"),
            status: Some(PodStatus {
                phase: Some("Evicted".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(format_pod(pod).phase, Some(PodPhase::Unknown));
    }

    #[test]
    fn test_format_service_ports() {
        let svc = Service {
            metadata: meta("frontend", "shop"),
            spec: Some(ServiceSpec {
                type_: Some("LoadBalancer".to_string()),
                cluster_ip: Some("10.96.12.3".to_string()),
                external_ips: Some(vec!["203.0.113.10".to_string()]),
                ports: Some(vec![
                    ServicePort {
                        port: 80,
                        target_port: Some(IntOrString::Int(8080)),
                        protocol: Some("TCP".to_string()),
                        ..Default::default()
                    },
                    ServicePort {
                        port: 443,
                        target_port: Some(IntOrString::String("https".to_string())),
                        protocol: Some("TCP".to_string()),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let summary = format_service(svc);
        assert_eq!(summary.service_type.as_deref(), Some("LoadBalancer"));
        assert_eq!(summary.external_ips, vec!["203.0.113.10".to_string()]);
        assert_eq!(summary.ports[0].target_port, Some(TargetPort::Number(8080)));
        assert_eq!(
            summary.ports[1].target_port,
            Some(TargetPort::Name("https".to_string()))
        );
    }

    #[test]
    fn test_format_service_without_external_ips() {
        let svc = Service {
            metadata: meta("internal", "default"),
            spec: Some(ServiceSpec {
                type_: Some("ClusterIP".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let summary = format_service(svc);
        assert!(summary.external_ips.is_empty());
        assert!(summary.ports.is_empty());
    }

    #[test]
    fn test_format_deployment() {
        let deploy = Deployment {
            metadata: meta("api", "prod"),
            spec: Some(DeploymentSpec {
                replicas: Some(3),
                template: PodTemplateSpec {
                    spec: Some(PodSpec {
                        containers: vec![container("api", "ghcr.io/acme/api:2.1")],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                available_replicas: Some(1),
                ..Default::default()
            }),
        };

        let summary = format_deployment(deploy);
        assert_eq!(summary.replicas, Some(3));
        assert_eq!(summary.available_replicas, Some(1));
        assert_eq!(summary.images, vec!["ghcr.io/acme/api:2.1".to_string()]);
    }

    #[test]
    fn test_format_deployment_without_status() {
        let deploy = Deployment {
            metadata: meta("pending", "prod"),
            ..Default::default()
        };

        let summary = format_deployment(deploy);
        assert_eq!(summary.replicas, None);
        assert_eq!(summary.available_replicas, None);
        assert!(summary.images.is_empty());
    }
}
