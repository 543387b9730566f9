use reqwest::Url;
use std::fmt;

const ROUTE_BASE: &str = "http://gemmaria/";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    PatientList,
    Mri {
        patient: String,
    },
    Report {
        patient: String,
        client_name: Option<String>,
    },
    Chat {
        patient: String,
        client_name: Option<String>,
    },
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let Some(url) = Url::parse(ROUTE_BASE)
            .ok()
            .and_then(|base| base.join(path).ok())
        else {
            log::warn!("Unparseable route `{path}`, showing patient list");
            return Route::PatientList;
        };

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .map(percent_decode)
                    .collect()
            })
            .unwrap_or_default();
        let client_name = url
            .query_pairs()
            .find(|(key, _)| key == "clientName")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());

        match segments.as_slice() {
            [] => Route::PatientList,
            [kind, patient] if kind == "mri" => Route::Mri {
                patient: patient.clone(),
            },
            [kind, patient] if kind == "report" => Route::Report {
                patient: patient.clone(),
                client_name,
            },
            [kind, patient] if kind == "chat" => Route::Chat {
                patient: patient.clone(),
                client_name,
            },
            _ => {
                log::warn!("Unknown route `{path}`, showing patient list");
                Route::PatientList
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, patient, client_name) = match self {
            Route::PatientList => return f.write_str("/"),
            Route::Mri { patient } => ("mri", patient, None),
            Route::Report {
                patient,
                client_name,
            } => ("report", patient, client_name.as_deref()),
            Route::Chat {
                patient,
                client_name,
            } => ("chat", patient, client_name.as_deref()),
        };

        let Ok(mut url) = Url::parse(ROUTE_BASE) else {
            return Err(fmt::Error);
        };
        url.path_segments_mut()
            .map_err(|_| fmt::Error)?
            .push(kind)
            .push(patient);
        if let Some(name) = client_name {
            url.query_pairs_mut().append_pair("clientName", name);
        }

        f.write_str(url.path())?;
        if let Some(query) = url.query() {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

fn percent_decode(segment: &str) -> String {
    // Path segments are decoded with the same rules as query values.
    Url::parse(&format!("{ROUTE_BASE}?s={segment}"))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .next()
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_four_routes() {
        assert_eq!(Route::parse("/"), Route::PatientList);
        assert_eq!(
            Route::parse("/mri/bob"),
            Route::Mri {
                patient: "bob".to_string()
            }
        );
        assert_eq!(
            Route::parse("/report/alice?clientName=Alice"),
            Route::Report {
                patient: "alice".to_string(),
                client_name: Some("Alice".to_string()),
            }
        );
        assert_eq!(
            Route::parse("/chat/bob"),
            Route::Chat {
                patient: "bob".to_string(),
                client_name: None,
            }
        );
    }

    #[test]
    fn unknown_paths_fall_back_to_the_list() {
        assert_eq!(Route::parse("/settings"), Route::PatientList);
        assert_eq!(Route::parse("/mri"), Route::PatientList);
        assert_eq!(Route::parse("/mri/bob/extra"), Route::PatientList);
    }

    #[test]
    fn client_name_is_percent_encoded() {
        let route = Route::Report {
            patient: "mary".to_string(),
            client_name: Some("Mary Ann".to_string()),
        };
        let rendered = route.to_string();
        assert_eq!(rendered, "/report/mary?clientName=Mary+Ann");
        assert_eq!(Route::parse(&rendered), route);
    }

    #[test]
    fn encoded_patient_segment_round_trips() {
        let route = Route::Mri {
            patient: "mary ann".to_string(),
        };
        assert_eq!(route.to_string(), "/mri/mary%20ann");
        assert_eq!(Route::parse("/mri/mary%20ann"), route);
    }
}
