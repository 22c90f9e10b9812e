//! Prompt construction for scenario completion

use crate::domain::scenario::Scenario;

/// Render the completion prompt for one scenario.
///
/// The template asks for a Norwegian discharge summary with inline entity
/// tags; the tagging instruction lines must stay aligned with
/// [`crate::domain::tags::KNOWN_LABELS`] (the catch-all label is never
/// requested). The wording is fixed so that regenerated corpora stay
/// comparable with existing ones.
pub fn format_scenario(scenario: &Scenario) -> String {
    format!(
        "\nWrite a discharge summary in Norwegian for a patient named {given_name} {family_name}, \
who has been diagnosed with {diagnosis}.\n\
Additionally, include the following information:\n\
- The patient is {age} years old.\n\
- The patient was admitted to {health_care_unit} on {admission_date}.\n\
- The patient was born in {city} on {birth_date}.\n\
- The patient's phone number is {phone_number}.\n\
- The patient's social security number is {social_security_number}.\n\
\n\
For every first name in the text, add surrounding <First_Name> tags.\n\
For every last name in the text, add surrounding <Last_Name> tags.\n\
For every person's age in the text, add surrounding <Age> tags.\n\
For every telephone number in the text, add surrounding <Phone_Number> tags.\n\
For every social security number in the text, add surrounding <Social_Security_Number> tags.\n\
For every hospital, healthcare institution and healthcare provider, add surrounding <Health_Care_Unit> tags.\n\
For every other location in the text, add surrounding <Location> tags.\n\
For every date in the text, add surrounding <Date> tags.\n\
Do not add any other tags.\n\
\n\
Epikrise:\n",
        given_name = scenario.given_name,
        family_name = scenario.family_name,
        diagnosis = scenario.diagnosis,
        age = scenario.age,
        health_care_unit = scenario.health_care_unit,
        admission_date = scenario.admission_date,
        city = scenario.city,
        birth_date = scenario.birth_date,
        phone_number = scenario.phone_number,
        social_security_number = scenario.social_security_number,
    )
}
