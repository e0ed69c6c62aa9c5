use anyhow::Context as _;

#[derive(Debug, serde::Serialize)]
struct DisplayOutput<'a, T> {
	#[serde(rename = "__type")]
	object_type: &'a str,
	#[serde(flatten)]
	value: &'a T,
}

fn object_type<T>() -> &'static str {
	let object_type = std::any::type_name::<T>();
	object_type.split("::").last().unwrap_or(object_type)
}

/// Renders a value as pretty JSON, or YAML when `json` is false.
pub fn render<T: serde::Serialize>(value: &T, json: bool) -> anyhow::Result<String> {
	let output = DisplayOutput {
		object_type: object_type::<T>(),
		value,
	};

	let output = if json {
		serde_json::to_string_pretty(&output).context("failed to display response")?
	} else {
		serde_yaml::to_string(&output).context("failed to display response")?
	};

	Ok(output.trim().to_owned())
}

pub fn render_array<T: serde::Serialize>(values: &[T], json: bool) -> anyhow::Result<String> {
	let object_type = object_type::<T>();

	let values = &values
		.iter()
		.map(|value| DisplayOutput { object_type, value })
		.collect::<Vec<_>>();

	let output = if json {
		serde_json::to_string_pretty(values).context("failed to display response")?
	} else {
		serde_yaml::to_string(values).context("failed to display response")?
	};

	Ok(output.trim().to_owned())
}
