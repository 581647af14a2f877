//! Weather conditions and field advisories

use serde::Serialize;

use crate::domain::entities::Language;

/// WMO weather interpretation code to text
pub fn condition(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// An advisory in all supported languages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub message_en: String,
    pub message_hi: String,
    pub message_te: String,
}

impl Advisory {
    fn new(kind: &str, severity: &str, en: String, hi: String, te: String) -> Self {
        Self {
            kind: kind.to_string(),
            severity: severity.to_string(),
            message_en: en,
            message_hi: hi,
            message_te: te,
        }
    }

    pub fn message(&self, language: Language) -> &str {
        match language {
            Language::En => &self.message_en,
            Language::Hi => &self.message_hi,
            Language::Te => &self.message_te,
        }
    }

    pub fn localize(&self, language: Language) -> LocalizedAdvisory {
        LocalizedAdvisory {
            kind: self.kind.clone(),
            severity: self.severity.clone(),
            message: self.message(language).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedAdvisory {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub message: String,
}

/// Readings the advisories are derived from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Conditions {
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    /// Sum of the daily precipitation over the forecast week
    pub rain_7day_mm: f64,
}

pub fn advisories(conditions: &Conditions) -> Vec<Advisory> {
    let mut out = Vec::new();

    let temp = conditions.temperature_c.unwrap_or(25.0);
    let humidity = conditions.humidity_percent.unwrap_or(60.0);
    let wind = conditions.wind_speed_kmh.unwrap_or(0.0);
    let rain = conditions.rain_7day_mm;

    if temp > 40.0 {
        out.push(Advisory::new(
            "heat_stress",
            "high",
            "Extreme heat alert! Avoid field work 11 AM - 4 PM. Irrigate in evening only.".into(),
            "अत्यधिक गर्मी की चेतावनी! सुबह 11 से शाम 4 बजे तक खेत में काम न करें। शाम को ही सिंचाई करें।".into(),
            "తీవ్ర వేడి హెచ్చరిక! 11 AM - 4 PM మధ్య పొలం పనులు చేయకండి. సాయంత్రం మాత్రమే నీరు పెట్టండి.".into(),
        ));
    } else if temp > 35.0 {
        out.push(Advisory::new(
            "heat_advisory",
            "medium",
            "High temperature. Provide shade for nurseries. Mulch to conserve moisture.".into(),
            "उच्च तापमान। नर्सरी को छाया दें। पानी बचाने के लिए मल्चिंग करें।".into(),
            "అధిక ఉష్ణోగ్రత. నర్సరీలకు నీడ ఇవ్వండి. తేమ కాపాడటానికి మల్చింగ్ చేయండి.".into(),
        ));
    } else if temp < 10.0 {
        out.push(Advisory::new(
            "cold_advisory",
            "medium",
            "Low temperature. Protect crops from frost. Irrigate in morning to reduce frost damage.".into(),
            "कम तापमान। फसलों को पाले से बचाएं। पाले के नुकसान को कम करने के लिए सुबह सिंचाई करें।".into(),
            "తక్కువ ఉష్ణోగ్రత. పంటలను మంచు నుండి రక్షించండి. మంచు నష్టాన్ని తగ్గించడానికి ఉదయం నీరు పెట్టండి.".into(),
        ));
    }

    if rain > 100.0 {
        out.push(Advisory::new(
            "heavy_rain_warning",
            "high",
            format!("Heavy rainfall expected ({:.0}mm in 7 days). Ensure field drainage. Postpone fertilizer application.", rain),
            format!("भारी बारिश की संभावना ({:.0}mm 7 दिनों में)। खेत में जल निकासी सुनिश्चित करें। उर्वरक डालने में देरी करें।", rain),
            format!("భారీ వర్షం అంచనా ({:.0}mm 7 రోజుల్లో). పొలంలో డ్రైనేజీ నిర్ధారించుకోండి. ఎరువులు వేయడం వాయిదా వేయండి.", rain),
        ));
    } else if rain > 50.0 {
        out.push(Advisory::new(
            "rain_expected",
            "low",
            format!("Good rainfall expected ({:.0}mm). Favorable for sowing. Complete land preparation.", rain),
            format!("अच्छी बारिश की संभावना ({:.0}mm)। बुवाई के लिए अनुकूल। भूमि की तैयारी पूरी करें।", rain),
            format!("మంచి వర్షం అంచనా ({:.0}mm). విత్తనానికి అనుకూలం. భూమి సిద్ధం పూర్తి చేయండి.", rain),
        ));
    } else if rain < 5.0 {
        out.push(Advisory::new(
            "dry_spell",
            "medium",
            "Dry spell expected. Plan irrigation. Watch for pest buildup in dry conditions.".into(),
            "सूखे की संभावना। सिंचाई की योजना बनाएं। सूखी परिस्थितियों में कीटों पर नजर रखें।".into(),
            "పొడి వాతావరణం అంచనా. నీటిపారుదల ప్రణాళిక చేయండి. పొడి పరిస్థితుల్లో పురుగుల పెరుగుదలను గమనించండి.".into(),
        ));
    }

    if humidity > 85.0 {
        out.push(Advisory::new(
            "disease_risk",
            "medium",
            "High humidity increases disease risk. Apply preventive fungicide. Avoid overhead irrigation.".into(),
            "उच्च आर्द्रता से रोग का खतरा बढ़ता है। निवारक फफूंदनाशक लगाएं। ऊपरी सिंचाई से बचें।".into(),
            "అధిక తేమ వల్ల వ్యాధుల ప్రమాదం పెరుగుతుంది. నివారణ శిలీంద్ర నాశిని చల్లండి. పై నుండి నీరు పెట్టడం మానండి.".into(),
        ));
    }

    if wind < 10.0 {
        out.push(Advisory::new(
            "spray_favorable",
            "info",
            "Low wind - favorable for pesticide/fertilizer spraying. Best time: early morning or late evening.".into(),
            "कम हवा - कीटनाशक/उर्वरक छिड़काव के लिए अनुकूल। सबसे अच्छा समय: सुबह जल्दी या शाम देर से।".into(),
            "తక్కువ గాలి - పురుగుమందు/ఎరువుల పిచికారికి అనుకూలం. ఉత్తమ సమయం: పొద్దున్నే లేదా సాయంత్రం.".into(),
        ));
    } else if wind > 20.0 {
        out.push(Advisory::new(
            "spray_unfavorable",
            "info",
            "High wind - avoid spraying pesticides/fertilizers. Risk of drift and wastage.".into(),
            "तेज हवा - कीटनाशक/उर्वरक छिड़काव न करें। बहाव और बर्बादी का खतरा।".into(),
            "అధిక గాలి - పురుగుమందులు/ఎరువులు పిచికారీ చేయకండి. కొట్టుకుపోయే ప్రమాదం.".into(),
        ));
    }

    out
}
