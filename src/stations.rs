use serde::Serialize;

/// The 22 top-level administrative regions a report can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum District {
    Taipei,
    NewTaipei,
    Taoyuan,
    Taichung,
    Tainan,
    Kaohsiung,
    Keelung,
    HsinchuCity,
    ChiayiCity,
    HsinchuCounty,
    Miaoli,
    Changhua,
    Nantou,
    Yunlin,
    ChiayiCounty,
    Pingtung,
    Yilan,
    Hualien,
    Taitung,
    Penghu,
    Kinmen,
    Lienchiang,
}

impl District {
    /// Canonical textual form. Address matching compares against this and
    /// nothing else; the informal 台 variant is normalized away first.
    pub fn name(&self) -> &'static str {
        match self {
            District::Taipei => "臺北市",
            District::NewTaipei => "新北市",
            District::Taoyuan => "桃園市",
            District::Taichung => "臺中市",
            District::Tainan => "臺南市",
            District::Kaohsiung => "高雄市",
            District::Keelung => "基隆市",
            District::HsinchuCity => "新竹市",
            District::ChiayiCity => "嘉義市",
            District::HsinchuCounty => "新竹縣",
            District::Miaoli => "苗栗縣",
            District::Changhua => "彰化縣",
            District::Nantou => "南投縣",
            District::Yunlin => "雲林縣",
            District::ChiayiCounty => "嘉義縣",
            District::Pingtung => "屏東縣",
            District::Yilan => "宜蘭縣",
            District::Hualien => "花蓮縣",
            District::Taitung => "臺東縣",
            District::Penghu => "澎湖縣",
            District::Kinmen => "金門縣",
            District::Lienchiang => "連江縣",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoliceStation {
    pub district: District,
    pub station_name: &'static str,
    pub phone_number: &'static str,
}

/// One receiving station per district. Scan order is the declaration order;
/// district names are pairwise non-overlapping substrings, so order only
/// tie-breaks degenerate future data.
pub static POLICE_STATIONS: [PoliceStation; 22] = [
    PoliceStation {
        district: District::Taipei,
        station_name: "臺北市政府警察局",
        phone_number: "0911510914",
    },
    PoliceStation {
        district: District::NewTaipei,
        station_name: "新北市政府警察局",
        phone_number: "0911510105",
    },
    PoliceStation {
        district: District::Taoyuan,
        station_name: "桃園市政府警察局",
        phone_number: "0917110880",
    },
    PoliceStation {
        district: District::Taichung,
        station_name: "臺中市政府警察局",
        phone_number: "0911510915",
    },
    PoliceStation {
        district: District::Tainan,
        station_name: "臺南市政府警察局",
        phone_number: "0911510916",
    },
    PoliceStation {
        district: District::Kaohsiung,
        station_name: "高雄市政府警察局",
        phone_number: "0911510917",
    },
    PoliceStation {
        district: District::Keelung,
        station_name: "基隆市警察局",
        phone_number: "0911510918",
    },
    PoliceStation {
        district: District::HsinchuCity,
        station_name: "新竹市警察局",
        phone_number: "0911510919",
    },
    PoliceStation {
        district: District::ChiayiCity,
        station_name: "嘉義市政府警察局",
        phone_number: "0911510920",
    },
    PoliceStation {
        district: District::HsinchuCounty,
        station_name: "新竹縣政府警察局",
        phone_number: "0911510921",
    },
    PoliceStation {
        district: District::Miaoli,
        station_name: "苗栗縣警察局",
        phone_number: "0911510922",
    },
    PoliceStation {
        district: District::Changhua,
        station_name: "彰化縣警察局",
        phone_number: "0911510933",
    },
    PoliceStation {
        district: District::Nantou,
        station_name: "南投縣政府警察局",
        phone_number: "0911510923",
    },
    PoliceStation {
        district: District::Yunlin,
        station_name: "雲林縣警察局",
        phone_number: "0911510924",
    },
    PoliceStation {
        district: District::ChiayiCounty,
        station_name: "嘉義縣警察局",
        phone_number: "0911510925",
    },
    PoliceStation {
        district: District::Pingtung,
        station_name: "屏東縣政府警察局",
        phone_number: "0911510926",
    },
    PoliceStation {
        district: District::Yilan,
        station_name: "宜蘭縣政府警察局",
        phone_number: "0911510927",
    },
    PoliceStation {
        district: District::Hualien,
        station_name: "花蓮縣警察局",
        phone_number: "0911510928",
    },
    PoliceStation {
        district: District::Taitung,
        station_name: "臺東縣警察局",
        phone_number: "0911510929",
    },
    PoliceStation {
        district: District::Penghu,
        station_name: "澎湖縣政府警察局",
        phone_number: "0911510930",
    },
    PoliceStation {
        district: District::Kinmen,
        station_name: "金門縣警察局",
        phone_number: "0911510931",
    },
    PoliceStation {
        district: District::Lienchiang,
        station_name: "連江縣警察局",
        phone_number: "0911510932",
    },
];

/// Returns the first station whose district name occurs in the address.
pub fn find_station_by_address(address: &str) -> Option<&'static PoliceStation> {
    let normalized = address.replace('台', "臺");
    POLICE_STATIONS
        .iter()
        .find(|station| normalized.contains(station.district.name()))
}

pub fn find_district(address: &str) -> Option<District> {
    find_station_by_address(address).map(|station| station.district)
}
