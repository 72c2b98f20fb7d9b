// ==========================================
// PlantX 运维智能中台 - 离线演示回答
// ==========================================
// 用途: 未配置 API Key 且启用 ai.demo_mode 时返回的固定回答
// ==========================================

const PUMP_FAILURE: &str = "How do I troubleshoot a pump failure?";
const EMERGENCY_SHUTDOWN: &str = "What are the emergency shutdown procedures?";
const MAINTENANCE_SCHEDULE: &str = "How to maintain equipment schedules?";

const PUMP_FAILURE_BODY: &str = "**Pump Failure Troubleshooting Steps:**

1. **Safety First**
   - Ensure pump is completely shut down
   - Lock out/tag out electrical supply
   - Release system pressure

2. **Initial Visual Inspection**
   - Check for obvious leaks or damage
   - Inspect coupling alignment
   - Verify motor rotation direction

3. **Common Issues & Solutions**
   - **No flow:** Check suction strainer, prime pump
   - **Low pressure:** Inspect impeller for wear/damage
   - **Excessive vibration:** Check shaft alignment, bearing condition
   - **Overheating:** Verify cooling water flow, check bearings

4. **Recommended Actions**
   - Document all findings
   - Replace worn components
   - Perform vibration analysis
   - Schedule follow-up inspection

**Contact maintenance team if issues persist.**";

const EMERGENCY_SHUTDOWN_BODY: &str = "**Emergency Shutdown Procedures:**

**IMMEDIATE ACTIONS:**
1. **Press Emergency Stop** - Red buttons located at each control station
2. **Alert Personnel** - Sound alarm and announce \"Emergency Shutdown\"
3. **Evacuate Area** - Move to designated safe zone

**SYSTEMATIC SHUTDOWN:**
1. **Stop Production Equipment**
   - Shut down conveyors and processing units
   - Close main supply valves
   - Activate emergency drainage

2. **Isolate Energy Sources**
   - Disconnect electrical supplies
   - Close gas/steam valves
   - Depressurize systems

3. **Ventilation & Safety**
   - Activate emergency ventilation
   - Check gas detection systems
   - Ensure fire suppression ready

**POST-SHUTDOWN:**
- Account for all personnel
- Contact emergency services if needed
- Begin damage assessment
- Document incident

**Only authorized personnel may restart systems after clearance.**";

const MAINTENANCE_SCHEDULE_BODY: &str = "**Equipment Maintenance Scheduling Best Practices:**

**1. Preventive Maintenance (PM) Schedule**
- **Daily:** Visual inspections, lubrication checks
- **Weekly:** Vibration monitoring, filter changes
- **Monthly:** Detailed inspections, calibrations
- **Quarterly:** Major component servicing
- **Annually:** Complete overhauls, certifications

**2. Condition-Based Maintenance**
- Monitor equipment health in real-time
- Use predictive analytics to schedule repairs
- Track performance trends and degradation

**3. Digital Tools & Tracking**
- Use CMMS (Computerized Maintenance Management System)
- Set automated alerts for due dates
- Track work orders and completion rates
- Maintain equipment history logs

**4. Resource Planning**
- Schedule skilled technicians
- Ensure parts availability
- Coordinate with production schedules
- Plan for equipment downtime

**5. Continuous Improvement**
- Analyze maintenance data
- Adjust schedules based on performance
- Train staff on new procedures
- Update documentation regularly";

/// 生成演示回答
///
/// # 参数
/// - provider_label: 回答抬头中展示的提供方名称
pub fn demo_answer(provider_label: &str, question: &str, context: &str) -> String {
    let body = match question.trim() {
        PUMP_FAILURE => PUMP_FAILURE_BODY.to_string(),
        EMERGENCY_SHUTDOWN => EMERGENCY_SHUTDOWN_BODY.to_string(),
        MAINTENANCE_SCHEDULE => MAINTENANCE_SCHEDULE_BODY.to_string(),
        _ => generic_body(question, context),
    };
    format!("**{} Response:**\n\n{}", provider_label, body)
}

fn generic_body(question: &str, context: &str) -> String {
    format!(
        "I'd be happy to help with \"{}\".\n\n\
         Based on the context provided: {}\n\n\
         Here are some general recommendations:\n\
         - Follow established safety procedures\n\
         - Consult equipment manuals and documentation\n\
         - Contact your supervisor or maintenance team for specific guidance\n\
         - Document any issues or observations\n\
         - Ensure proper training before performing any procedures\n\n\
         For more detailed assistance, please provide additional context about your specific situation or equipment involved.",
        question, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_question() {
        let answer = demo_answer("Claude", "How do I troubleshoot a pump failure?", "");
        assert!(answer.starts_with("**Claude Response:**"));
        assert!(answer.contains("Lock out/tag out"));
    }

    #[test]
    fn test_generic_answer_echoes_input() {
        let answer = demo_answer("OpenAI", "Why is the boiler tripping?", "Plant B");
        assert!(answer.contains("\"Why is the boiler tripping?\""));
        assert!(answer.contains("Based on the context provided: Plant B"));
    }
}
