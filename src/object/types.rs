//! The 16-bit object-type tag table.
//!
//! Every blob and every nested object site starts with one of these tags.
//! The table is closed: tags outside it fail the load. Only a subset has a
//! loader (see `object::read_object`); the rest are recognized so error
//! messages can name them.

macro_rules! object_types {
    ($($value:literal => $variant:ident / $name:literal,)*) => {
        /// Known object-type tags.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ObjectType {
            $($variant,)*
        }

        impl ObjectType {
            pub fn from_u16(value: u16) -> Option<ObjectType> {
                match value {
                    $($value => Some(ObjectType::$variant),)*
                    _ => None,
                }
            }

            pub fn tag(&self) -> u16 {
                match self {
                    $(ObjectType::$variant => $value,)*
                }
            }

            /// Canonical kernel name of the type.
            pub fn name(&self) -> &'static str {
                match self {
                    $(ObjectType::$variant => $name,)*
                }
            }
        }
    };
}

object_types! {
    0x0000 => DbUnknown / "DB_UNKNOWN",
    0x0002 => DbKeyVector / "DB_KEY_VECTOR",
    0x0003 => DbCase / "DB_CASE",
    0x0004 => DbCases / "DB_CASES",
    0x0005 => DbCompuBase / "DB_COMPU_BASE",
    0x0006 => DbCompuInternalToPhys / "DB_COMPU_INTERNAL_TO_PHYS",
    0x0007 => DbProtParamData / "DB_PROT_PARAM_DATA",
    0x000A => DbCompuMethod / "DB_COMPU_METHOD",
    0x000F => DbCompuPhysToInternal / "DB_COMPU_PHYS_TO_INTERNAL",
    0x0014 => DbCompuRationalCoeffs / "DB_COMPU_RATIONAL_COEFFS",
    0x0019 => DbCompuScale / "DB_COMPU_SCALE",
    0x001E => DbCompuScales / "DB_COMPU_SCALES",
    0x0020 => DbDefaultCase / "DB_DEFAULT_CASE",
    0x0021 => DbEcuConfigInfo / "DB_ECU_CONFIG_INFO",
    0x0023 => DbDiagCodedType / "DB_DIAG_CODED_TYPE",
    0x0027 => DbDopBase / "DB_DOP_BASE",
    0x0028 => DbDopDtc / "DB_DOP_DTC",
    0x0029 => DbDopStruct / "DB_DOP_STRUCT",
    0x002C => DbDopSimpleBase / "DB_DOP_SIMPLE_BASE",
    0x002D => DbEcuVariantPattern / "DB_ECU_VARIANT_PATTERN",
    0x002E => DbEcuVariantPatterns / "DB_ECU_VARIANT_PATTERNS",
    0x002F => DbEnvData / "DB_ENV_DATA",
    0x0030 => DbEnvDataRefSet / "DB_ENV_DATA_REF_SET",
    0x0031 => DbLayerData / "DB_LAYER_DATA",
    0x0032 => DbInternalConstraint / "DB_INTERNAL_CONSTRAINT",
    0x0033 => DbProjectData / "DB_PROJECT_DATA",
    0x0034 => DbVehicleInfoData / "DB_VEHICLE_INFO_DATA",
    0x0037 => DbLimit / "DB_LIMIT",
    0x0038 => DbMatchingParameter / "DB_MATCHING_PARAMETER",
    0x0039 => DbMatchingParameters / "DB_MATCHING_PARAMETERS",
    0x003C => DbPhysicalType / "DB_PHYSICAL_TYPE",
    0x0041 => McdDbCodeInformation / "MCD_DB_CODE_INFORMATION",
    0x0042 => McdDbCodeInformations / "MCD_DB_CODE_INFORMATIONS",
    0x0046 => DbRelatedServices / "DB_RELATED_SERVICES",
    0x0048 => DbScaleConstraint / "DB_SCALE_CONSTRAINT",
    0x0049 => DbScaleConstraints / "DB_SCALE_CONSTRAINTS",
    0x004A => DbServiceProtocolParameter / "DB_SERVICE_PROTOCOL_PARAMETER",
    0x004B => DbServiceProtocolParameters / "DB_SERVICE_PROTOCOL_PARAMETERS",
    0x004C => DbSwitchKey / "DB_SWITCH_KEY",
    0x004D => McdAccessKey / "MCD_ACCESS_KEY",
    0x004E => McdDbAccessLevel / "MCD_DB_ACCESS_LEVEL",
    0x004F => McdDbControlPrimitives / "MCD_DB_CONTROL_PRIMITIVES",
    0x0050 => McdDbControlPrimitiveReferences / "MCD_DB_CONTROL_PRIMITIVE_REFERENCES",
    0x0051 => McdDbDataPrimitives / "MCD_DB_DATA_PRIMITIVES",
    0x0052 => McdDbDataPrimitiveReferences / "MCD_DB_DATA_PRIMITIVE_REFERENCES",
    0x0053 => McdDbDiagComPrimitives / "MCD_DB_DIAG_COM_PRIMITIVES",
    0x0054 => McdDbDiagComPrimitiveReferences / "MCD_DB_DIAG_COM_PRIMITIVE_REFERENCES",
    0x0055 => McdDbDiagServices / "MCD_DB_DIAG_SERVICES",
    0x0056 => McdDbDiagServiceReferences / "MCD_DB_DIAG_SERVICE_REFERENCES",
    0x0057 => McdDbDiagTroubleCode / "MCD_DB_DIAG_TROUBLE_CODE",
    0x0058 => McdDbDiagTroubleCodes / "MCD_DB_DIAG_TROUBLE_CODES",
    0x0059 => McdDbDiagTroubleCodeReferences / "MCD_DB_DIAG_TROUBLE_CODE_REFERENCES",
    0x005A => McdDbEcuBaseVariant / "MCD_DB_ECU_BASE_VARIANT",
    0x005B => McdDbEcuBaseVariants / "MCD_DB_ECU_BASE_VARIANTS",
    0x005C => McdDbEcuVariant / "MCD_DB_ECU_VARIANT",
    0x005D => McdDbEcuVariants / "MCD_DB_ECU_VARIANTS",
    0x005E => McdDbFunctionalClass / "MCD_DB_FUNCTIONAL_CLASS",
    0x005F => McdDbFunctionalClasses / "MCD_DB_FUNCTIONAL_CLASSES",
    0x0060 => McdDbFunctionalClassReferences / "MCD_DB_FUNCTIONAL_CLASS_REFERENCES",
    0x0061 => McdDbFunctionalGroups / "MCD_DB_FUNCTIONAL_GROUPS",
    0x0062 => McdDbHelpServiceReferences / "MCD_DB_HELP_SERVICE_REFERENCES",
    0x0063 => McdDbInputParam / "MCD_DB_INPUT_PARAM",
    0x0064 => McdDbJob / "MCD_DB_JOB",
    0x0065 => McdDbJobReferences / "MCD_DB_JOB_REFERENCES",
    0x0066 => McdDbJobs / "MCD_DB_JOBS",
    0x0067 => McdDbLocation / "MCD_DB_LOCATION",
    0x0068 => McdDbLocationReferences / "MCD_DB_LOCATION_REFERENCES",
    0x0069 => McdDbLocations / "MCD_DB_LOCATIONS",
    0x006A => McdDbLogicalLink / "MCD_DB_LOGICAL_LINK",
    0x006B => McdDbLogicalLinks / "MCD_DB_LOGICAL_LINKS",
    0x006C => McdDbLogicalLinkReferences / "MCD_DB_LOGICAL_LINK_REFERENCES",
    0x006D => McdDbParameters / "MCD_DB_PARAMETERS",
    0x006E => McdDbPhysicalVehicleLinkOrInterface / "MCD_DB_PHYSICAL_VEHICLE_LINK_OR_INTERFACE",
    0x006F => McdDbPhysicalVehicleLinkOrInterfaces / "MCD_DB_PHYSICAL_VEHICLE_LINK_OR_INTERFACES",
    0x0071 => McdDbProject / "MCD_DB_PROJECT",
    0x0072 => McdDbProtocolParameter / "MCD_DB_PROTOCOL_PARAMETER",
    0x0073 => McdDbProtocolParameterSet / "MCD_DB_PROTOCOL_PARAMETER_SET",
    0x0078 => McdDbRequest / "MCD_DB_REQUEST",
    0x0079 => McdDbRequestParameters / "MCD_DB_REQUEST_PARAMETERS",
    0x0091 => McdDbResponse / "MCD_DB_RESPONSE",
    0x0092 => McdDbResponseParameters / "MCD_DB_RESPONSE_PARAMETERS",
    0x0093 => McdDbParameterDynamicEndmarkerField / "MCD_DB_PARAMETER_DYNAMIC_ENDMARKER_FIELD",
    0x0094 => McdDbParameterDynamicLengthField / "MCD_DB_PARAMETER_DYNAMIC_LENGTH_FIELD",
    0x0095 => McdDbParameterEndOfPduField / "MCD_DB_PARAMETER_END_OF_PDU_FIELD",
    0x0096 => McdDbParameterEnvDataDesc / "MCD_DB_PARAMETER_ENV_DATA_DESC",
    0x0097 => McdDbParameterEnvData / "MCD_DB_PARAMETER_ENV_DATA",
    0x00A0 => McdDbParameterMultiplexer / "MCD_DB_PARAMETER_MULTIPLEXER",
    0x00A1 => McdDbParameterReferences / "MCD_DB_PARAMETER_REFERENCES",
    0x00A4 => McdDbParameter / "MCD_DB_PARAMETER",
    0x00A5 => McdDbParameterSimple / "MCD_DB_PARAMETER_SIMPLE",
    0x00A6 => McdDbParameterStaticField / "MCD_DB_PARAMETER_STATIC_FIELD",
    0x00A7 => McdDbMatchingRequestParameter / "MCD_DB_MATCHING_REQUEST_PARAMETER",
    0x00A8 => McdDbParameterStructField / "MCD_DB_PARAMETER_STRUCT_FIELD",
    0x00AA => McdDbParameterStructure / "MCD_DB_PARAMETER_STRUCTURE",
    0x00AB => McdDbTable / "MCD_DB_TABLE",
    0x00AC => McdDbTableParameter / "MCD_DB_TABLE_PARAMETER",
    0x00AD => McdDbTableParameters / "MCD_DB_TABLE_PARAMETERS",
    0x00B0 => McdDbParameterTablestruct / "MCD_DB_PARAMETER_TABLESTRUCT",
    0x00B1 => McdDbParameterTableEntry / "MCD_DB_PARAMETER_TABLE_ENTRY",
    0x00B2 => McdDbParameterTableKey / "MCD_DB_PARAMETER_TABLE_KEY",
    0x00B9 => McdDbResponses / "MCD_DB_RESPONSES",
    0x00BE => McdDbService / "MCD_DB_SERVICE",
    0x00BF => McdDbSingleEcuJob / "MCD_DB_SINGLE_ECU_JOB",
    0x00C3 => McdDbServices / "MCD_DB_SERVICES",
    0x00C8 => McdDbServiceReferences / "MCD_DB_SERVICE_REFERENCES",
    0x00C9 => McdDbVehicleConnector / "MCD_DB_VEHICLE_CONNECTOR",
    0x00D0 => McdDbVehicleConnectors / "MCD_DB_VEHICLE_CONNECTORS",
    0x00D1 => McdDbVehicleConnectorPin / "MCD_DB_VEHICLE_CONNECTOR_PIN",
    0x00D2 => McdDbVehicleConnectorPins / "MCD_DB_VEHICLE_CONNECTOR_PINS",
    0x00D3 => McdDbVehicleConnectorPinReferences / "MCD_DB_VEHICLE_CONNECTOR_PIN_REFERENCES",
    0x00D4 => McdDbVehicleInformation / "MCD_DB_VEHICLE_INFORMATION",
    0x00D5 => McdDbVehicleInformations / "MCD_DB_VEHICLE_INFORMATIONS",
    0x00D6 => McdDbEcuVariantReferences / "MCD_DB_ECU_VARIANT_REFERENCES",
    0x00D7 => McdDbEcuBaseVariantReferences / "MCD_DB_ECU_BASE_VARIANT_REFERENCES",
    0x00D8 => McdDbVehicleInformationReferences / "MCD_DB_VEHICLE_INFORMATION_REFERENCES",
    0x00E0 => McdDbEcuMem / "MCD_DB_ECU_MEM",
    0x00E1 => McdDbEcuMems / "MCD_DB_ECU_MEMS",
    0x00E2 => McdDbFlashChecksum / "MCD_DB_FLASH_CHECKSUM",
    0x00E3 => McdDbFlashChecksums / "MCD_DB_FLASH_CHECKSUMS",
    0x00E4 => McdDbFlashDataBlock / "MCD_DB_FLASH_DATA_BLOCK",
    0x00E5 => McdDbFlashDataBlocks / "MCD_DB_FLASH_DATA_BLOCKS",
    0x00E6 => McdDbFlashData / "MCD_DB_FLASH_DATA",
    0x00E7 => McdDbFlashFilter / "MCD_DB_FLASH_FILTER",
    0x00E8 => McdDbFlashFilters / "MCD_DB_FLASH_FILTERS",
    0x00E9 => McdDbFlashIdent / "MCD_DB_FLASH_IDENT",
    0x00EA => McdDbFlashIdents / "MCD_DB_FLASH_IDENTS",
    0x00EB => McdDbFlashSecurity / "MCD_DB_FLASH_SECURITY",
    0x00EC => McdDbFlashSecurities / "MCD_DB_FLASH_SECURITIES",
    0x00ED => McdDbFlashSegment / "MCD_DB_FLASH_SEGMENT",
    0x00EE => McdDbFlashSegments / "MCD_DB_FLASH_SEGMENTS",
    0x00EF => McdDbFlashSessionClass / "MCD_DB_FLASH_SESSION_CLASS",
    0x00F0 => McdDbFlashSessionClasses / "MCD_DB_FLASH_SESSION_CLASSES",
    0x00F1 => McdDbFlashSession / "MCD_DB_FLASH_SESSION",
    0x00F2 => McdDbFlashSessions / "MCD_DB_FLASH_SESSIONS",
    0x00F3 => McdDbPhysicalSegment / "MCD_DB_PHYSICAL_SEGMENT",
    0x00F4 => McdDbPhysicalSegments / "MCD_DB_PHYSICAL_SEGMENTS",
    0x00F5 => McdDbPhysicalMemory / "MCD_DB_PHYSICAL_MEMORY",
    0x00F6 => McdDbPhysicalMemories / "MCD_DB_PHYSICAL_MEMORIES",
    0x00F8 => McdDbFlashJob / "MCD_DB_FLASH_JOB",
    0x00F9 => McdDbIdentDescription / "MCD_DB_IDENT_DESCRIPTION",
    0x00FA => McdValues / "MCD_VALUES",
    0x00FB => McdInterval / "MCD_INTERVAL",
    0x00FC => McdAccessKeys / "MCD_ACCESS_KEYS",
    0x00FD => McdDbFunctionalGroup / "MCD_DB_FUNCTIONAL_GROUP",
    0x00FE => McdTextTableElement / "MCD_TEXT_TABLE_ELEMENT",
    0x00FF => McdTextTableElements / "MCD_TEXT_TABLE_ELEMENTS",
    0x0100 => McdDbDiagVariable / "MCD_DB_DIAG_VARIABLE",
    0x0101 => McdDbDiagVariables / "MCD_DB_DIAG_VARIABLES",
    0x0102 => McdDbUnit / "MCD_DB_UNIT",
    0x0103 => McdDbUnits / "MCD_DB_UNITS",
    0x0104 => McdDbUnitGroup / "MCD_DB_UNIT_GROUP",
    0x0105 => McdDbUnitGroups / "MCD_DB_UNIT_GROUPS",
    0x0106 => McdDbDataPrimitive / "MCD_DB_DATA_PRIMITIVE",
    0x0107 => McdDbStartCommunication / "MCD_DB_STARTCOMMUNICATION",
    0x0108 => McdDbStopCommunication / "MCD_DB_STOPCOMMUNICATION",
    0x0109 => McdDbVariantIdentification / "MCD_DB_VARIANTIDENTIFICATION",
    0x010A => McdDbVariantIdentificationAndSelection / "MCD_DB_VARIANTIDENTIFICATIONANDSELECTION",
    0x010B => McdDbProtocolParameterSetAlt / "MCD_DB_PROTOCOLPARAMETERSET",
    0x010C => McdDbPhysicalDimension / "MCD_DB_PHYSICAL_DIMENSION",
    0x010D => McdDbEcu / "MCD_DB_ECU",
    0x010E => McdDbFunctionalGroupReferences / "MCD_DB_FUNCTIONAL_GROUP_REFERENCES",
    0x010F => McdDbSpecialDataGroups / "MCD_DB_SPECIAL_DATA_GROUPS",
    0x0110 => McdDbSpecialDataGroup / "MCD_DB_SPECIAL_DATA_GROUP",
    0x0111 => McdDbSpecialDataElement / "MCD_DB_SPECIAL_DATA_ELEMENT",
    0x0112 => McdDbDynIdDefineComPrimitive / "MCD_DB_DYN_ID_DEFINE_COM_PRIMITIVE",
    0x0113 => McdDbDynIdReadComPrimitive / "MCD_DB_DYN_ID_READ_COM_PRIMITIVE",
    0x0114 => McdDbDynIdClearComPrimitive / "MCD_DB_DYN_ID_CLEAR_COM_PRIMITIVE",
    0x0115 => McdAudience / "MCD_AUDIENCE",
    0x0116 => McdDbMultipleEcuJob / "MCD_DB_MULTIPLE_ECU_JOB",
    0x0119 => McdDbTables / "MCD_DB_TABLES",
    0x011D => McdDbTableReferences / "MCD_DB_TABLE_REFERENCES",
    0x0120 => McdDbEcuMemReferences / "MCD_DB_ECU_MEM_REFERENCES",
    0x0121 => McdDbUnitReferences / "MCD_DB_UNIT_REFERENCES",
    0x0122 => McdDbFlashSessionClassReferences / "MCD_DB_FLASH_SESSION_CLASS_REFERENCES",
    0x0123 => McdDbFlashSessionReferences / "MCD_DB_FLASH_SESSION_REFERENCES",
    0x0124 => McdDbHexService / "MCD_DB_HEX_SERVICE",
    0x0126 => McdDbTableParameterReferences / "MCD_DB_TABLE_PARAMETER_REFERENCES",
    0x0127 => McdDbPhysicalMemoryReferences / "MCD_DB_PHYSICAL_MEMORY_REFERENCES",
    0x0128 => McdDbUnitGroupReferences / "MCD_DB_UNIT_GROUP_REFERENCES",
    0x0180 => McdDbConfigurationData / "MCD_DB_CONFIGURATION_DATA",
    0x0181 => McdDbConfigurationDatas / "MCD_DB_CONFIGURATION_DATAS",
    0x0182 => McdDbConfigurationDataReferences / "MCD_DB_CONFIGURATION_DATA_REFERENCES",
    0x0183 => McdDbConfigurationIdItem / "MCD_DB_CONFIGURATION_ID_ITEM",
    0x0184 => McdDbConfigurationRecord / "MCD_DB_CONFIGURATION_RECORD",
    0x0185 => McdDbConfigurationRecords / "MCD_DB_CONFIGURATION_RECORDS",
    0x0186 => McdDbConfigurationRecordReferences / "MCD_DB_CONFIGURATION_RECORD_REFERENCES",
    0x0187 => McdDbCodingData / "MCD_DB_CODING_DATA",
    0x0188 => McdDbConfigurationItem / "MCD_DB_CONFIGURATION_ITEM",
    0x0189 => McdDbDataIdItem / "MCD_DB_DATA_ID_ITEM",
    0x018A => McdDbDataRecord / "MCD_DB_DATA_RECORD",
    0x018B => McdDbDataRecords / "MCD_DB_DATA_RECORDS",
    0x018C => McdDbDataRecordReferences / "MCD_DB_DATA_RECORD_REFERENCES",
    0x018D => McdDbItemValue / "MCD_DB_ITEM_VALUE",
    0x018E => McdDbItemValues / "MCD_DB_ITEM_VALUES",
    0x018F => McdDbOptionItem / "MCD_DB_OPTION_ITEM",
    0x0190 => McdDbOptionItems / "MCD_DB_OPTION_ITEMS",
    0x0191 => McdDbSystemItem / "MCD_DB_SYSTEM_ITEM",
    0x0192 => McdDbSystemItems / "MCD_DB_SYSTEM_ITEMS",
    0x0193 => DbDiagComDataConnector / "DB_DIAG_COM_DATA_CONNECTOR",
    0x0194 => DbDiagComDataConnectors / "DB_DIAG_COM_DATA_CONNECTORS",
    0x0195 => McdDbMatchingParameter / "MCD_DB_MATCHING_PARAMETER",
    0x0196 => McdDbMatchingParameters / "MCD_DB_MATCHING_PARAMETERS",
    0x0197 => McdDbSubComponent / "MCD_DB_SUB_COMPONENT",
    0x0198 => McdDbSubComponents / "MCD_DB_SUB_COMPONENTS",
    0x0199 => McdDbSubComponentReferences / "MCD_DB_SUB_COMPONENT_REFERENCES",
    0x019A => McdDbMatchingPattern / "MCD_DB_MATCHING_PATTERN",
    0x019B => McdDbMatchingPatterns / "MCD_DB_MATCHING_PATTERNS",
    0x019C => McdDbSubComponentParamConnector / "MCD_DB_SUB_COMPONENT_PARAM_CONNECTOR",
    0x019D => McdDbSubComponentParamConnectors / "MCD_DB_SUB_COMPONENT_PARAM_CONNECTORS",
    0x01A0 => McdDbEcuState / "MCD_DB_ECU_STATE",
    0x01A3 => McdDbEcuStateChart / "MCD_DB_ECU_STATE_CHART",
    0x01A6 => McdDbEcuStateCharts / "MCD_DB_ECU_STATE_CHARTS",
    0x01A9 => McdDbEcuStates / "MCD_DB_ECU_STATES",
    0x01AC => McdDbEcuStateTransition / "MCD_DB_ECU_STATE_TRANSITION",
    0x01AF => McdDbEcuStateTransitions / "MCD_DB_ECU_STATE_TRANSITIONS",
    0x01B2 => McdDbExternalAccessMethod / "MCD_DB_EXTERNAL_ACCESS_METHOD",
    0x01B5 => McdDbPreconditionDefinition / "MCD_DB_PRECONDITION_DEFINITION",
    0x01B8 => McdDbPreconditionDefinitions / "MCD_DB_PRECONDITION_DEFINITIONS",
    0x01BB => McdDbStateTransitionAction / "MCD_DB_STATE_TRANSITION_ACTION",
    0x01BE => McdDbStateTransitionActions / "MCD_DB_STATE_TRANSITION_ACTIONS",
    0x01C1 => McdDbEcuStateReferences / "MCD_DB_ECU_STATE_REFERENCES",
    0x01C4 => McdDbEcuStateChartReferences / "MCD_DB_ECU_STATE_CHART_REFERENCES",
    0x01C7 => McdDbEcuStateTransitionReferences / "MCD_DB_ECU_STATE_TRANSITION_REFERENCES",
    0x01CA => McdDbStateTransitionActionReferences / "MCD_DB_STATE_TRANSITION_ACTION_REFERENCES",
    0x01CD => McdDbPreConditionDefinitionReferences / "MCD_DB_PRE_CONDITION_DEFINITION_REFERENCES",
    0x0200 => McdInternalConstraint / "MCD_INTERNAL_CONSTRAINT",
    0x0201 => McdScaleConstraints / "MCD_SCALE_CONSTRAINTS",
    0x0202 => McdScaleConstraint / "MCD_SCALE_CONSTRAINT",
    0x0203 => McdConstraint / "MCD_CONSTRAINT",
    0x0204 => McdIntervals / "MCD_INTERVALS",
    0x0210 => McdDbSpecialDataGroupCaption / "MCD_DB_SPECIAL_DATA_GROUP_CAPTION",
    0x0211 => McdDbSpecialDataGroupReferences / "MCD_DB_SPECIAL_DATA_GROUP_REFERENCES",
    0x0220 => McdDbResponseReferences / "MCD_DB_RESPONSE_REFERENCES",
    0x0230 => McdDbParameterReference / "MCD_DB_PARAMETER_REFERENCE",
    0x0240 => McdDbAdditionalAudiences / "MCD_DB_ADDITIONAL_AUDIENCES",
    0x0241 => McdDbAdditionalAudience / "MCD_DB_ADDITIONAL_AUDIENCE",
    0x0250 => DbOdxLink / "DB_ODX_LINK",
    0x0251 => DbOdxLinks / "DB_ODX_LINKS",
    0x0255 => DbLibrary / "DB_LIBRARY",
    0x0300 => McdDbBaseFunctionNode / "MCD_DB_BASE_FUNCTION_NODE",
    0x0301 => McdDbComponentConnector / "MCD_DB_COMPONENT_CONNECTOR",
    0x0302 => McdDbComponentConnectors / "MCD_DB_COMPONENT_CONNECTORS",
    0x0303 => McdDbDiagObjectConnector / "MCD_DB_DIAG_OBJECT_CONNECTOR",
    0x0304 => McdDbDiagTroubleCodeConnector / "MCD_DB_DIAG_TROUBLE_CODE_CONNECTOR",
    0x0305 => McdDbDiagTroubleCodeConnectors / "MCD_DB_DIAG_TROUBLE_CODE_CONNECTORS",
    0x0306 => McdDbFaultMemory / "MCD_DB_FAULT_MEMORY",
    0x0307 => McdDbEnvDataConnector / "MCD_DB_ENV_DATA_CONNECTOR",
    0x0308 => McdDbEnvDataConnectors / "MCD_DB_ENV_DATA_CONNECTORS",
    0x0309 => McdDbEnvDataDesc / "MCD_DB_ENV_DATA_DESC",
    0x030A => McdDbFunctionDiagComConnector / "MCD_DB_FUNCTION_DIAG_COM_CONNECTOR",
    0x030B => McdDbFunctionDiagComConnectors / "MCD_DB_FUNCTION_DIAG_COM_CONNECTORS",
    0x030C => McdDbFunctionDictionary / "MCD_DB_FUNCTION_DICTIONARY",
    0x030D => McdDbFunctionDictionaries / "MCD_DB_FUNCTION_DICTIONARIES",
    0x030E => McdDbFunctionInParameter / "MCD_DB_FUNCTION_IN_PARAMETER",
    0x030F => McdDbFunctionInParameters / "MCD_DB_FUNCTION_IN_PARAMETERS",
    0x0310 => McdDbFunctionOutParameter / "MCD_DB_FUNCTION_OUT_PARAMETER",
    0x0311 => McdDbFunctionOutParameters / "MCD_DB_FUNCTION_OUT_PARAMETERS",
    0x0312 => McdDbFunctionNode / "MCD_DB_FUNCTION_NODE",
    0x0313 => McdDbFunctionNodes / "MCD_DB_FUNCTION_NODES",
    0x0314 => McdDbFunctionNodeGroup / "MCD_DB_FUNCTION_NODE_GROUP",
    0x0315 => McdDbFunctionNodeGroups / "MCD_DB_FUNCTION_NODE_GROUPS",
    0x0316 => McdDbTableRowConnector / "MCD_DB_TABLE_ROW_CONNECTOR",
    0x0317 => McdDbTableRowConnectors / "MCD_DB_TABLE_ROW_CONNECTORS",
    0x0318 => DbFunctionDictionaryData / "DB_FUNCTION_DICTIONARY_DATA",
    0x0319 => DbComParamSpec / "DB_COM_PARAM_SPEC",
    0x031A => DbComParamSubSet / "DB_COM_PARAM_SUB_SET",
    0x031B => DbFlashData / "DB_FLASH_DATA",
    0x031C => McdDbEnvDataDescs / "MCD_DB_ENV_DATA_DESCS",
    0x031D => McdDbFaultMemories / "MCD_DB_FAULT_MEMORIES",
    0x031E => DbStateChartData / "DB_STATE_CHART_DATA",
    0x031F => DbInlineFlashData / "DB_INLINE_FLASH_DATA",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        for tag in [0x0000u16, 0x002C, 0x00A4, 0x01CD, 0x031F] {
            let ty = ObjectType::from_u16(tag).unwrap();
            assert_eq!(ty.tag(), tag);
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert!(ObjectType::from_u16(0x0001).is_none());
        assert!(ObjectType::from_u16(0xFFFF).is_none());
    }

    #[test]
    fn names_match_kernel_spelling() {
        assert_eq!(
            ObjectType::from_u16(0x002C).unwrap().name(),
            "DB_DOP_SIMPLE_BASE"
        );
        assert_eq!(
            ObjectType::from_u16(0x00A0).unwrap().name(),
            "MCD_DB_PARAMETER_MULTIPLEXER"
        );
    }
}
