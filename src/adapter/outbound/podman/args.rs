//! Rendering of a [`ContainerLaunchSpec`] as `podman run` arguments.

use crate::domain::{ContainerLaunchSpec, DeviceRequest};

/// Arguments following `podman`, ending with the image.
#[must_use]
pub fn run_args(spec: &ContainerLaunchSpec) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--detach".to_string()];
    if spec.auto_remove {
        args.push("--rm".into());
    }

    for (key, value) in &spec.labels {
        args.push("--label".into());
        args.push(format!("{key}={value}"));
    }
    for (key, value) in &spec.env {
        args.push("--env".into());
        args.push(format!("{key}={value}"));
    }

    args.push("--publish".into());
    args.push(format!("{}:{}", spec.port.host, spec.port.container));

    let mut mount = format!(
        "type=bind,source={},target={}",
        spec.mount.source.display(),
        spec.mount.target
    );
    if spec.mount.read_only {
        mount.push_str(",readonly");
    }
    args.push("--mount".into());
    args.push(mount);

    for device in &spec.devices {
        args.push("--device".into());
        args.push(format!("{}:{}", device.host_path, device.container_path));
    }
    for request in &spec.device_requests {
        args.push("--gpus".into());
        args.push(gpu_count(request));
    }

    let health = &spec.health_check;
    args.push("--health-cmd".into());
    args.push(health.command());
    args.push("--health-interval".into());
    args.push(format!("{}s", health.interval.as_secs()));
    args.push("--health-retries".into());
    args.push(health.retries.to_string());

    args.push(spec.image.clone());
    args
}

fn gpu_count(request: &DeviceRequest) -> String {
    request
        .count
        .map_or_else(|| "all".to_string(), |count| count.to_string())
}
