pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_contacts.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_contacts.sql")),
				"tables/002_auth_users.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_auth_users.sql")),
				"tables/003_demands.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_demands.sql")),
				"tables/004_supplies.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_supplies.sql")),
				"tables/005_raw_intake.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_raw_intake.sql")),
				"tables/006_volunteers.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_volunteers.sql")),
				"tables/007_matches.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_matches.sql")),
				"tables/008_user_logs.sql" =>
					out.push_str(include_str!("../../../sql/tables/008_user_logs.sql")),
				"functions/compute_matches.sql" =>
					out.push_str(include_str!("../../../sql/functions/compute_matches.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
